//! The converged table declarations.

use super::{
  ColumnDef as C, ColumnType, DefaultValue, Table, TableDef,
};
use crate::terminology::EnumKind;

const STATE: C = C::new("state", ColumnType::VarChar(2));
const ZIPCODE: C = C::new("zipcode", ColumnType::VarChar(5));
const TERM: C = C::new("term", ColumnType::Enum(EnumKind::Terminology));

/// Every declared table.
pub static TABLES: &[&TableDef] = &[
  &META_RECORD,
  &PATIENT,
  &ORGANIZATION,
  &PAYER,
  &PROVIDER,
  &ENCOUNTER,
  &CONDITION,
  &PROCEDURE,
  &MEDICATION,
  &IMAGING,
  &SNOMED,
  &RXNORM,
];

// ─── Provenance ──────────────────────────────────────────────────────────────

// `target_id` may name a row in any table, so it carries no reference.
pub(super) static META_RECORD: TableDef = TableDef {
  table:   Table::MetaRecord,
  columns: &[
    C::id(),
    C::text("task_id"),
    C::text("data_source"),
    C::datetime("entry_date").with_default(DefaultValue::Now),
    C::text("target_entity"),
    C::new("target_id", ColumnType::Uuid),
  ],
};

// ─── Parties ─────────────────────────────────────────────────────────────────

pub(super) static PATIENT: TableDef = TableDef {
  table:   Table::Patient,
  columns: &[
    C::id(),
    C::text("last_name"),
    C::text("first_name"),
    C::text("suffix"),
    C::datetime("birth_date"),
    C::datetime("death_date"),
    C::text("marital_status"),
    C::text("sex"),
    C::text("gender"),
    C::text("race"),
    C::text("ethnicity"),
    C::text("street"),
    C::text("city"),
    STATE,
    ZIPCODE,
  ],
};

pub(super) static ORGANIZATION: TableDef = TableDef {
  table:   Table::Organization,
  columns: &[
    C::id(),
    C::text("name"),
    C::text("street"),
    C::text("city"),
    STATE,
    ZIPCODE,
    C::new("phone", ColumnType::Telephone),
  ],
};

pub(super) static PAYER: TableDef = TableDef {
  table:   Table::Payer,
  columns: &[
    C::id(),
    C::text("name"),
    C::text("street"),
    C::text("city"),
    STATE,
    ZIPCODE,
    C::new("phone", ColumnType::Telephone),
  ],
};

pub(super) static PROVIDER: TableDef = TableDef {
  table:   Table::Provider,
  columns: &[
    C::id(),
    C::foreign_key("organization_id", Table::Organization),
    C::text("name"),
    C::new("degree", ColumnType::Enum(EnumKind::Degree)),
    C::text("gender"),
    C::text("specialty"),
    C::text("street"),
    C::text("city"),
    STATE,
    ZIPCODE,
  ],
};

// ─── Encounter ───────────────────────────────────────────────────────────────

pub(super) static ENCOUNTER: TableDef = TableDef {
  table:   Table::Encounter,
  columns: &[
    C::id(),
    C::datetime("start_date"),
    C::datetime("end_date"),
    C::foreign_key("patient_id", Table::Patient).not_null(),
    C::foreign_key("organization_id", Table::Organization),
    C::foreign_key("provider_id", Table::Provider),
    C::foreign_key("payer_id", Table::Payer),
    C::text("external_id").unique(),
    TERM,
    C::text("code"),
    C::text("enc_class"),
    C::text("description"),
  ],
};

// ─── Clinical facts ──────────────────────────────────────────────────────────
//
// Encounter is the required link. `patient_id` on fact tables is an optional
// shortcut to the encounter's patient.

pub(super) static CONDITION: TableDef = TableDef {
  table:   Table::Condition,
  columns: &[
    C::id(),
    C::datetime("start_date"),
    C::datetime("end_date"),
    C::foreign_key("encounter_id", Table::Encounter).not_null(),
    C::foreign_key("patient_id", Table::Patient),
    TERM,
    C::text("code"),
    C::text("description"),
  ],
};

pub(super) static PROCEDURE: TableDef = TableDef {
  table:   Table::Procedure,
  columns: &[
    C::id(),
    C::datetime("date"),
    C::foreign_key("encounter_id", Table::Encounter).not_null(),
    C::foreign_key("patient_id", Table::Patient),
    C::foreign_key("condition_id", Table::Condition),
    TERM,
    C::text("code"),
    C::text("description"),
  ],
};

pub(super) static MEDICATION: TableDef = TableDef {
  table:   Table::Medication,
  columns: &[
    C::id(),
    C::datetime("start_date"),
    C::datetime("end_date"),
    C::foreign_key("encounter_id", Table::Encounter).not_null(),
    C::foreign_key("payer_id", Table::Payer),
    C::foreign_key("condition_id", Table::Condition),
    TERM,
    C::text("code"),
    C::text("description"),
    C::new("dispenses", ColumnType::Integer),
  ],
};

pub(super) static IMAGING: TableDef = TableDef {
  table:   Table::Imaging,
  columns: &[
    C::id(),
    C::datetime("study_date"),
    C::foreign_key("encounter_id", Table::Encounter).not_null(),
    C::foreign_key("patient_id", Table::Patient),
    C::new("modality", ColumnType::Enum(EnumKind::Modality)),
    C::text("modality_description"),
    TERM,
    C::text("body_part_code"),
    C::text("body_part"),
    C::text("sop_code"),
    C::text("sop_description"),
  ],
};

// ─── Terminology dictionaries ────────────────────────────────────────────────

pub(super) static SNOMED: TableDef = TableDef {
  table:   Table::Snomed,
  columns: &[
    C::id(),
    C::text("code").not_null().unique(),
    C::text("description"),
  ],
};

pub(super) static RXNORM: TableDef = TableDef {
  table:   Table::Rxnorm,
  columns: &[
    C::id(),
    C::text("code").not_null().unique(),
    C::text("description"),
  ],
};
