//! Declarative table, column and relationship definitions.
//!
//! All declarations are `static` data. Storage engines read them to allocate
//! storage and to declare constraints; the row binder reads them to pick the
//! coercion for each column.

mod relations;
mod tables;

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

pub use relations::{
  Cardinality, Direction, Navigation, RELATIONS, Relation, insertion_order,
  navigate, navigations,
};
pub use tables::TABLES;

use crate::terminology::EnumKind;

// ─── Table ───────────────────────────────────────────────────────────────────

/// Every table in the model.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Table {
  /// Provenance of an ingestion task.
  #[strum(serialize = "db_meta_data")]
  MetaRecord,
  Patient,
  Organization,
  Payer,
  Provider,
  Encounter,
  Condition,
  Procedure,
  Medication,
  Imaging,
  Snomed,
  Rxnorm,
}

impl Table {
  /// The SQL table name.
  pub fn name(self) -> &'static str { self.into() }

  pub fn def(self) -> &'static TableDef {
    match self {
      Self::MetaRecord => &tables::META_RECORD,
      Self::Patient => &tables::PATIENT,
      Self::Organization => &tables::ORGANIZATION,
      Self::Payer => &tables::PAYER,
      Self::Provider => &tables::PROVIDER,
      Self::Encounter => &tables::ENCOUNTER,
      Self::Condition => &tables::CONDITION,
      Self::Procedure => &tables::PROCEDURE,
      Self::Medication => &tables::MEDICATION,
      Self::Imaging => &tables::IMAGING,
      Self::Snomed => &tables::SNOMED,
      Self::Rxnorm => &tables::RXNORM,
    }
  }
}

// ─── Columns ─────────────────────────────────────────────────────────────────

/// The declared type of a column, which also selects its bind-side coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
  Uuid,
  /// Nullable integer; NaN binds as NULL.
  Integer,
  /// Ten-digit phone number.
  Telephone,
  Text,
  /// Text of at most this many characters.
  VarChar(usize),
  DateTime,
  Enum(EnumKind),
}

/// A value generated for a column when the row leaves it empty.
///
/// Defaults are evaluated per row at bind time, never once per schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
  /// A fresh random (v4) UUID.
  NewUuid,
  /// The current UTC time.
  Now,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
  pub name:        &'static str,
  pub ty:          ColumnType,
  pub primary_key: bool,
  pub nullable:    bool,
  pub unique:      bool,
  /// Foreign key to the primary key of this table.
  pub references:  Option<Table>,
  pub default:     Option<DefaultValue>,
}

impl ColumnDef {
  pub const fn new(name: &'static str, ty: ColumnType) -> Self {
    Self {
      name,
      ty,
      primary_key: false,
      nullable: true,
      unique: false,
      references: None,
      default: None,
    }
  }

  /// The surrogate `id` primary key every table carries.
  pub const fn id() -> Self {
    Self {
      primary_key: true,
      nullable: false,
      default: Some(DefaultValue::NewUuid),
      ..Self::new("id", ColumnType::Uuid)
    }
  }

  pub const fn text(name: &'static str) -> Self {
    Self::new(name, ColumnType::Text)
  }

  pub const fn datetime(name: &'static str) -> Self {
    Self::new(name, ColumnType::DateTime)
  }

  /// A nullable UUID foreign key to `table`.
  pub const fn foreign_key(name: &'static str, table: Table) -> Self {
    Self { references: Some(table), ..Self::new(name, ColumnType::Uuid) }
  }

  pub const fn not_null(self) -> Self { Self { nullable: false, ..self } }

  pub const fn unique(self) -> Self { Self { unique: true, ..self } }

  pub const fn with_default(self, default: DefaultValue) -> Self {
    Self { default: Some(default), ..self }
  }
}

// ─── TableDef ────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct TableDef {
  pub table:   Table,
  pub columns: &'static [ColumnDef],
}

impl TableDef {
  pub fn name(&self) -> &'static str { self.table.name() }

  pub fn column(&self, name: &str) -> Option<&'static ColumnDef> {
    self.columns.iter().find(|c| c.name == name)
  }

  pub fn primary_key(&self) -> &'static ColumnDef {
    // Every declaration starts with `ColumnDef::id()`.
    let columns: &'static [ColumnDef] = self.columns;
    &columns[0]
  }

  /// Columns that reference another table.
  pub fn foreign_keys(
    &'static self,
  ) -> impl Iterator<Item = (&'static ColumnDef, Table)> {
    self.columns.iter().filter_map(|c| c.references.map(|t| (c, t)))
  }
}
