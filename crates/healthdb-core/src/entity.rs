//! Typed records for every table.
//!
//! Each struct mirrors its [`TableDef`](crate::schema::TableDef) column for
//! column. An `id` of `None` asks the binder for a freshly generated one.
//! Phone fields may hold any formatting on the way in; after a round trip
//! through storage they hold the canonical ten digits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  row::{Row, StoredRow},
  schema::Table,
  terminology::{Degree, Modality, Terminology},
};

/// A typed view of one table's rows.
pub trait Entity: Sized {
  const TABLE: Table;

  fn id(&self) -> Option<Uuid>;

  /// Convert into an unbound [`Row`] for [`bind_row`](crate::row::bind_row).
  fn into_row(self) -> Row;

  /// Decode a row read back from storage.
  fn from_stored(row: &StoredRow) -> Result<Self>;
}

fn check_table(row: &StoredRow, expected: Table) -> Result<()> {
  if row.table() == expected {
    Ok(())
  } else {
    Err(Error::format(format!(
      "cannot decode a {} row as {expected}",
      row.table()
    )))
  }
}

// ─── MetaRecord ──────────────────────────────────────────────────────────────

/// Provenance for one ingested row: which task wrote it, from where, and
/// which row it was. `target_id` is informational and never checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaRecord {
  pub id:            Option<Uuid>,
  pub task_id:       Option<String>,
  pub data_source:   Option<String>,
  /// Defaults to the time the row is bound.
  pub entry_date:    Option<DateTime<Utc>>,
  pub target_entity: Option<String>,
  pub target_id:     Option<Uuid>,
}

impl Entity for MetaRecord {
  const TABLE: Table = Table::MetaRecord;

  fn id(&self) -> Option<Uuid> { self.id }

  fn into_row(self) -> Row {
    Row::new()
      .with("id", self.id)
      .with("task_id", self.task_id)
      .with("data_source", self.data_source)
      .with("entry_date", self.entry_date)
      .with("target_entity", self.target_entity)
      .with("target_id", self.target_id)
  }

  fn from_stored(row: &StoredRow) -> Result<Self> {
    check_table(row, Self::TABLE)?;
    Ok(Self {
      id:            Some(row.id()?),
      task_id:       row.text("task_id")?,
      data_source:   row.text("data_source")?,
      entry_date:    row.timestamp("entry_date")?,
      target_entity: row.text("target_entity")?,
      target_id:     row.uuid("target_id")?,
    })
  }
}

// ─── Patient ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patient {
  pub id:             Option<Uuid>,
  pub last_name:      Option<String>,
  pub first_name:     Option<String>,
  pub suffix:         Option<String>,
  pub birth_date:     Option<DateTime<Utc>>,
  pub death_date:     Option<DateTime<Utc>>,
  pub marital_status: Option<String>,
  pub sex:            Option<String>,
  pub gender:         Option<String>,
  pub race:           Option<String>,
  pub ethnicity:      Option<String>,
  pub street:         Option<String>,
  pub city:           Option<String>,
  pub state:          Option<String>,
  pub zipcode:        Option<String>,
}

impl Entity for Patient {
  const TABLE: Table = Table::Patient;

  fn id(&self) -> Option<Uuid> { self.id }

  fn into_row(self) -> Row {
    Row::new()
      .with("id", self.id)
      .with("last_name", self.last_name)
      .with("first_name", self.first_name)
      .with("suffix", self.suffix)
      .with("birth_date", self.birth_date)
      .with("death_date", self.death_date)
      .with("marital_status", self.marital_status)
      .with("sex", self.sex)
      .with("gender", self.gender)
      .with("race", self.race)
      .with("ethnicity", self.ethnicity)
      .with("street", self.street)
      .with("city", self.city)
      .with("state", self.state)
      .with("zipcode", self.zipcode)
  }

  fn from_stored(row: &StoredRow) -> Result<Self> {
    check_table(row, Self::TABLE)?;
    Ok(Self {
      id:             Some(row.id()?),
      last_name:      row.text("last_name")?,
      first_name:     row.text("first_name")?,
      suffix:         row.text("suffix")?,
      birth_date:     row.timestamp("birth_date")?,
      death_date:     row.timestamp("death_date")?,
      marital_status: row.text("marital_status")?,
      sex:            row.text("sex")?,
      gender:         row.text("gender")?,
      race:           row.text("race")?,
      ethnicity:      row.text("ethnicity")?,
      street:         row.text("street")?,
      city:           row.text("city")?,
      state:          row.text("state")?,
      zipcode:        row.text("zipcode")?,
    })
  }
}

// ─── Organization & Payer ────────────────────────────────────────────────────

/// A care-delivery site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Organization {
  pub id:      Option<Uuid>,
  pub name:    Option<String>,
  pub street:  Option<String>,
  pub city:    Option<String>,
  pub state:   Option<String>,
  pub zipcode: Option<String>,
  pub phone:   Option<String>,
}

impl Entity for Organization {
  const TABLE: Table = Table::Organization;

  fn id(&self) -> Option<Uuid> { self.id }

  fn into_row(self) -> Row {
    Row::new()
      .with("id", self.id)
      .with("name", self.name)
      .with("street", self.street)
      .with("city", self.city)
      .with("state", self.state)
      .with("zipcode", self.zipcode)
      .with("phone", self.phone)
  }

  fn from_stored(row: &StoredRow) -> Result<Self> {
    check_table(row, Self::TABLE)?;
    Ok(Self {
      id:      Some(row.id()?),
      name:    row.text("name")?,
      street:  row.text("street")?,
      city:    row.text("city")?,
      state:   row.text("state")?,
      zipcode: row.text("zipcode")?,
      phone:   row.text("phone")?,
    })
  }
}

/// An insurer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payer {
  pub id:      Option<Uuid>,
  pub name:    Option<String>,
  pub street:  Option<String>,
  pub city:    Option<String>,
  pub state:   Option<String>,
  pub zipcode: Option<String>,
  pub phone:   Option<String>,
}

impl Entity for Payer {
  const TABLE: Table = Table::Payer;

  fn id(&self) -> Option<Uuid> { self.id }

  fn into_row(self) -> Row {
    Row::new()
      .with("id", self.id)
      .with("name", self.name)
      .with("street", self.street)
      .with("city", self.city)
      .with("state", self.state)
      .with("zipcode", self.zipcode)
      .with("phone", self.phone)
  }

  fn from_stored(row: &StoredRow) -> Result<Self> {
    check_table(row, Self::TABLE)?;
    Ok(Self {
      id:      Some(row.id()?),
      name:    row.text("name")?,
      street:  row.text("street")?,
      city:    row.text("city")?,
      state:   row.text("state")?,
      zipcode: row.text("zipcode")?,
      phone:   row.text("phone")?,
    })
  }
}

// ─── Provider ────────────────────────────────────────────────────────────────

/// A clinician, optionally attached to an organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provider {
  pub id:              Option<Uuid>,
  pub organization_id: Option<Uuid>,
  pub name:            Option<String>,
  pub degree:          Option<Degree>,
  pub gender:          Option<String>,
  pub specialty:       Option<String>,
  pub street:          Option<String>,
  pub city:            Option<String>,
  pub state:           Option<String>,
  pub zipcode:         Option<String>,
}

impl Entity for Provider {
  const TABLE: Table = Table::Provider;

  fn id(&self) -> Option<Uuid> { self.id }

  fn into_row(self) -> Row {
    Row::new()
      .with("id", self.id)
      .with("organization_id", self.organization_id)
      .with("name", self.name)
      .with("degree", self.degree)
      .with("gender", self.gender)
      .with("specialty", self.specialty)
      .with("street", self.street)
      .with("city", self.city)
      .with("state", self.state)
      .with("zipcode", self.zipcode)
  }

  fn from_stored(row: &StoredRow) -> Result<Self> {
    check_table(row, Self::TABLE)?;
    Ok(Self {
      id:              Some(row.id()?),
      organization_id: row.uuid("organization_id")?,
      name:            row.text("name")?,
      degree:          row.code("degree")?,
      gender:          row.text("gender")?,
      specialty:       row.text("specialty")?,
      street:          row.text("street")?,
      city:            row.text("city")?,
      state:           row.text("state")?,
      zipcode:         row.text("zipcode")?,
    })
  }
}

// ─── Encounter ───────────────────────────────────────────────────────────────

/// A clinical visit; the join point for every clinical fact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
  pub id:              Option<Uuid>,
  pub start_date:      Option<DateTime<Utc>>,
  pub end_date:        Option<DateTime<Utc>>,
  /// Required; the store rejects encounters without a patient.
  pub patient_id:      Option<Uuid>,
  pub organization_id: Option<Uuid>,
  pub provider_id:     Option<Uuid>,
  pub payer_id:        Option<Uuid>,
  /// Identifier in the source feed; unique across encounters.
  pub external_id:     Option<String>,
  pub term:            Option<Terminology>,
  pub code:            Option<String>,
  pub enc_class:       Option<String>,
  pub description:     Option<String>,
}

impl Entity for Encounter {
  const TABLE: Table = Table::Encounter;

  fn id(&self) -> Option<Uuid> { self.id }

  fn into_row(self) -> Row {
    Row::new()
      .with("id", self.id)
      .with("start_date", self.start_date)
      .with("end_date", self.end_date)
      .with("patient_id", self.patient_id)
      .with("organization_id", self.organization_id)
      .with("provider_id", self.provider_id)
      .with("payer_id", self.payer_id)
      .with("external_id", self.external_id)
      .with("term", self.term)
      .with("code", self.code)
      .with("enc_class", self.enc_class)
      .with("description", self.description)
  }

  fn from_stored(row: &StoredRow) -> Result<Self> {
    check_table(row, Self::TABLE)?;
    Ok(Self {
      id:              Some(row.id()?),
      start_date:      row.timestamp("start_date")?,
      end_date:        row.timestamp("end_date")?,
      patient_id:      row.uuid("patient_id")?,
      organization_id: row.uuid("organization_id")?,
      provider_id:     row.uuid("provider_id")?,
      payer_id:        row.uuid("payer_id")?,
      external_id:     row.text("external_id")?,
      term:            row.code("term")?,
      code:            row.text("code")?,
      enc_class:       row.text("enc_class")?,
      description:     row.text("description")?,
    })
  }
}

// ─── Clinical facts ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
  pub id:           Option<Uuid>,
  pub start_date:   Option<DateTime<Utc>>,
  pub end_date:     Option<DateTime<Utc>>,
  pub encounter_id: Option<Uuid>,
  pub patient_id:   Option<Uuid>,
  pub term:         Option<Terminology>,
  pub code:         Option<String>,
  pub description:  Option<String>,
}

impl Entity for Condition {
  const TABLE: Table = Table::Condition;

  fn id(&self) -> Option<Uuid> { self.id }

  fn into_row(self) -> Row {
    Row::new()
      .with("id", self.id)
      .with("start_date", self.start_date)
      .with("end_date", self.end_date)
      .with("encounter_id", self.encounter_id)
      .with("patient_id", self.patient_id)
      .with("term", self.term)
      .with("code", self.code)
      .with("description", self.description)
  }

  fn from_stored(row: &StoredRow) -> Result<Self> {
    check_table(row, Self::TABLE)?;
    Ok(Self {
      id:           Some(row.id()?),
      start_date:   row.timestamp("start_date")?,
      end_date:     row.timestamp("end_date")?,
      encounter_id: row.uuid("encounter_id")?,
      patient_id:   row.uuid("patient_id")?,
      term:         row.code("term")?,
      code:         row.text("code")?,
      description:  row.text("description")?,
    })
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
  pub id:           Option<Uuid>,
  pub date:         Option<DateTime<Utc>>,
  pub encounter_id: Option<Uuid>,
  pub patient_id:   Option<Uuid>,
  /// The condition this procedure addresses, if known.
  pub condition_id: Option<Uuid>,
  pub term:         Option<Terminology>,
  pub code:         Option<String>,
  pub description:  Option<String>,
}

impl Entity for Procedure {
  const TABLE: Table = Table::Procedure;

  fn id(&self) -> Option<Uuid> { self.id }

  fn into_row(self) -> Row {
    Row::new()
      .with("id", self.id)
      .with("date", self.date)
      .with("encounter_id", self.encounter_id)
      .with("patient_id", self.patient_id)
      .with("condition_id", self.condition_id)
      .with("term", self.term)
      .with("code", self.code)
      .with("description", self.description)
  }

  fn from_stored(row: &StoredRow) -> Result<Self> {
    check_table(row, Self::TABLE)?;
    Ok(Self {
      id:           Some(row.id()?),
      date:         row.timestamp("date")?,
      encounter_id: row.uuid("encounter_id")?,
      patient_id:   row.uuid("patient_id")?,
      condition_id: row.uuid("condition_id")?,
      term:         row.code("term")?,
      code:         row.text("code")?,
      description:  row.text("description")?,
    })
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Medication {
  pub id:           Option<Uuid>,
  pub start_date:   Option<DateTime<Utc>>,
  pub end_date:     Option<DateTime<Utc>>,
  pub encounter_id: Option<Uuid>,
  pub payer_id:     Option<Uuid>,
  /// The condition this medication treats, if known.
  pub condition_id: Option<Uuid>,
  pub term:         Option<Terminology>,
  pub code:         Option<String>,
  pub description:  Option<String>,
  pub dispenses:    Option<i64>,
}

impl Entity for Medication {
  const TABLE: Table = Table::Medication;

  fn id(&self) -> Option<Uuid> { self.id }

  fn into_row(self) -> Row {
    Row::new()
      .with("id", self.id)
      .with("start_date", self.start_date)
      .with("end_date", self.end_date)
      .with("encounter_id", self.encounter_id)
      .with("payer_id", self.payer_id)
      .with("condition_id", self.condition_id)
      .with("term", self.term)
      .with("code", self.code)
      .with("description", self.description)
      .with("dispenses", self.dispenses)
  }

  fn from_stored(row: &StoredRow) -> Result<Self> {
    check_table(row, Self::TABLE)?;
    Ok(Self {
      id:           Some(row.id()?),
      start_date:   row.timestamp("start_date")?,
      end_date:     row.timestamp("end_date")?,
      encounter_id: row.uuid("encounter_id")?,
      payer_id:     row.uuid("payer_id")?,
      condition_id: row.uuid("condition_id")?,
      term:         row.code("term")?,
      code:         row.text("code")?,
      description:  row.text("description")?,
      dispenses:    row.integer("dispenses")?,
    })
  }
}

/// An imaging study and the DICOM series it produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Imaging {
  pub id:                   Option<Uuid>,
  pub study_date:           Option<DateTime<Utc>>,
  pub encounter_id:         Option<Uuid>,
  pub patient_id:           Option<Uuid>,
  pub modality:             Option<Modality>,
  pub modality_description: Option<String>,
  pub term:                 Option<Terminology>,
  pub body_part_code:       Option<String>,
  pub body_part:            Option<String>,
  /// DICOM SOP class.
  pub sop_code:             Option<String>,
  pub sop_description:      Option<String>,
}

impl Entity for Imaging {
  const TABLE: Table = Table::Imaging;

  fn id(&self) -> Option<Uuid> { self.id }

  fn into_row(self) -> Row {
    Row::new()
      .with("id", self.id)
      .with("study_date", self.study_date)
      .with("encounter_id", self.encounter_id)
      .with("patient_id", self.patient_id)
      .with("modality", self.modality)
      .with("modality_description", self.modality_description)
      .with("term", self.term)
      .with("body_part_code", self.body_part_code)
      .with("body_part", self.body_part)
      .with("sop_code", self.sop_code)
      .with("sop_description", self.sop_description)
  }

  fn from_stored(row: &StoredRow) -> Result<Self> {
    check_table(row, Self::TABLE)?;
    Ok(Self {
      id:                   Some(row.id()?),
      study_date:           row.timestamp("study_date")?,
      encounter_id:         row.uuid("encounter_id")?,
      patient_id:           row.uuid("patient_id")?,
      modality:             row.code("modality")?,
      modality_description: row.text("modality_description")?,
      term:                 row.code("term")?,
      body_part_code:       row.text("body_part_code")?,
      body_part:            row.text("body_part")?,
      sop_code:             row.text("sop_code")?,
      sop_description:      row.text("sop_description")?,
    })
  }
}

// ─── Terminology dictionaries ────────────────────────────────────────────────

/// A code-to-description entry in one terminology dictionary table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeEntry {
  pub id:          Option<Uuid>,
  pub code:        String,
  pub description: Option<String>,
}

impl CodeEntry {
  fn into_row(self) -> Row {
    Row::new()
      .with("id", self.id)
      .with("code", self.code)
      .with("description", self.description)
  }

  fn from_stored(row: &StoredRow) -> Result<Self> {
    let code = row.text("code")?.ok_or_else(|| {
      Error::format("dictionary code is null").at(row.table().name(), "code")
    })?;
    Ok(Self {
      id: Some(row.id()?),
      code,
      description: row.text("description")?,
    })
  }
}

/// An entry in the SNOMED CT dictionary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnomedCode(pub CodeEntry);

/// An entry in the RxNorm dictionary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RxNormCode(pub CodeEntry);

impl Entity for SnomedCode {
  const TABLE: Table = Table::Snomed;

  fn id(&self) -> Option<Uuid> { self.0.id }

  fn into_row(self) -> Row { self.0.into_row() }

  fn from_stored(row: &StoredRow) -> Result<Self> {
    check_table(row, Self::TABLE)?;
    CodeEntry::from_stored(row).map(Self)
  }
}

impl Entity for RxNormCode {
  const TABLE: Table = Table::Rxnorm;

  fn id(&self) -> Option<Uuid> { self.0.id }

  fn into_row(self) -> Row { self.0.into_row() }

  fn from_stored(row: &StoredRow) -> Result<Self> {
    check_table(row, Self::TABLE)?;
    CodeEntry::from_stored(row).map(Self)
  }
}
