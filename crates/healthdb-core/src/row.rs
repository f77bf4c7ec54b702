//! Rows on their way into and out of storage.
//!
//! A [`Row`] holds loosely-typed [`Value`]s keyed by column name. [`bind_row`]
//! applies per-row defaults and each column's coercion, producing a
//! [`StoredRow`] of canonical values ready to be written. Storage engines
//! hand back the same [`StoredRow`] shape on read, passing each value
//! through [`result_value`].

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer, ser::SerializeMap as _};
use uuid::Uuid;

use crate::{
  Error, Result,
  coerce::{Coercion, IntegerCoercion, TelephoneCoercion, UuidCoercion},
  schema::{ColumnDef, ColumnType, DefaultValue, Table},
  value::{Stored, Value, decode_dt, encode_dt},
};

// ─── Row ─────────────────────────────────────────────────────────────────────

/// Column values for one row, prior to coercion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
  values: Vec<(String, Value)>,
}

impl Row {
  pub fn new() -> Self { Self::default() }

  /// Builder form of [`Self::insert`].
  pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
    self.insert(column, value);
    self
  }

  /// Set a column, replacing any earlier value for it.
  pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
    let column = column.into();
    let value = value.into();
    match self.values.iter_mut().find(|(c, _)| *c == column) {
      Some((_, slot)) => *slot = value,
      None => self.values.push((column, value)),
    }
  }

  pub fn get(&self, column: &str) -> Option<&Value> {
    self.values.iter().find(|(c, _)| c == column).map(|(_, v)| v)
  }

  pub fn len(&self) -> usize { self.values.len() }

  pub fn is_empty(&self) -> bool { self.values.is_empty() }

  fn take(&mut self, column: &str) -> Option<Value> {
    let index = self.values.iter().position(|(c, _)| c == column)?;
    Some(self.values.swap_remove(index).1)
  }
}

// ─── StoredRow ───────────────────────────────────────────────────────────────

/// Canonical column values for one row, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRow {
  table:  Table,
  values: Vec<(&'static str, Stored)>,
}

impl StoredRow {
  /// Assemble a row read back from storage. Columns must be given in
  /// declaration order.
  pub fn new(table: Table, values: Vec<(&'static str, Stored)>) -> Self {
    Self { table, values }
  }

  pub fn table(&self) -> Table { self.table }

  pub fn values(&self) -> &[(&'static str, Stored)] { &self.values }

  pub fn get(&self, column: &str) -> Option<&Stored> {
    self.values.iter().find(|(c, _)| *c == column).map(|(_, v)| v)
  }

  fn require(&self, column: &'static str) -> Result<&Stored> {
    self.get(column).ok_or(Error::MissingColumn {
      table: self.table.name(),
      column,
    })
  }

  fn decode<T>(
    &self,
    column: &'static str,
    f: impl FnOnce(&Stored) -> Result<Option<T>>,
  ) -> Result<Option<T>> {
    f(self.require(column)?).map_err(|e| e.at(self.table.name(), column))
  }

  /// The primary key.
  pub fn id(&self) -> Result<Uuid> {
    self.uuid("id")?.ok_or_else(|| {
      Error::format("primary key is null").at(self.table.name(), "id")
    })
  }

  pub fn uuid(&self, column: &'static str) -> Result<Option<Uuid>> {
    self.decode(column, |v| match v {
      Stored::Null => Ok(None),
      Stored::Text(s) => Uuid::parse_str(s)
        .map(Some)
        .map_err(|e| Error::format(format!("invalid stored uuid {s:?}: {e}"))),
      Stored::Integer(_) => Err(Error::format("expected uuid text")),
    })
  }

  pub fn text(&self, column: &'static str) -> Result<Option<String>> {
    self.decode(column, |v| match v {
      Stored::Null => Ok(None),
      Stored::Text(s) => Ok(Some(s.clone())),
      Stored::Integer(_) => Err(Error::format("expected text")),
    })
  }

  pub fn integer(&self, column: &'static str) -> Result<Option<i64>> {
    self.decode(column, |v| match v {
      Stored::Null => Ok(None),
      Stored::Integer(n) => Ok(Some(*n)),
      Stored::Text(_) => Err(Error::format("expected integer")),
    })
  }

  pub fn timestamp(&self, column: &'static str) -> Result<Option<DateTime<Utc>>> {
    self.decode(column, |v| match v {
      Stored::Null => Ok(None),
      Stored::Text(s) => decode_dt(s).map(Some),
      Stored::Integer(_) => Err(Error::format("expected timestamp text")),
    })
  }

  /// Decode an enumerated code column (e.g. a [`Terminology`]).
  ///
  /// [`Terminology`]: crate::terminology::Terminology
  pub fn code<T: FromStr>(&self, column: &'static str) -> Result<Option<T>> {
    self.decode(column, |v| match v {
      Stored::Null => Ok(None),
      Stored::Text(s) => T::from_str(s)
        .map(Some)
        .map_err(|_| Error::format(format!("unknown code {s:?}"))),
      Stored::Integer(_) => Err(Error::format("expected code text")),
    })
  }
}

impl Serialize for StoredRow {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.values.len()))?;
    for (column, value) in &self.values {
      map.serialize_entry(column, value)?;
    }
    map.end()
  }
}

// ─── Binding ─────────────────────────────────────────────────────────────────

/// Coerce `row` into the canonical values for `table`.
///
/// Columns the row leaves out (or sets to a null-like value) bind as NULL,
/// unless the column declares a default, which is generated afresh for this
/// row. NOT NULL, uniqueness and foreign keys are left to the storage engine.
pub fn bind_row(table: Table, mut row: Row) -> Result<StoredRow> {
  let def = table.def();

  if let Some((unknown, _)) =
    row.values.iter().find(|(c, _)| def.column(c).is_none())
  {
    return Err(Error::UnknownColumn {
      table:  def.name(),
      column: unknown.clone(),
    });
  }

  let values = def
    .columns
    .iter()
    .map(|column| {
      let value = row.take(column.name).unwrap_or(Value::Null);
      let value = match column.default {
        Some(default) if value.is_null_like() => generate(default),
        _ => value,
      };
      bind_value(column, value)
        .map(|stored| (column.name, stored))
        .map_err(|e| e.at(def.name(), column.name))
    })
    .collect::<Result<_>>()?;

  Ok(StoredRow { table, values })
}

fn generate(default: DefaultValue) -> Value {
  match default {
    DefaultValue::NewUuid => Value::Uuid(Uuid::new_v4()),
    DefaultValue::Now => Value::Timestamp(Utc::now()),
  }
}

/// Coerce one value according to its column declaration.
pub fn bind_value(column: &ColumnDef, value: Value) -> Result<Stored> {
  Ok(match column.ty {
    ColumnType::Uuid => UuidCoercion.bind(value)?.into(),
    ColumnType::Integer => IntegerCoercion.bind(value)?.into(),
    ColumnType::Telephone => TelephoneCoercion.bind(value)?.into(),
    ColumnType::Text => bind_text(value)?.into(),
    ColumnType::VarChar(max) => {
      let text = bind_text(value)?;
      if let Some(s) = &text
        && s.chars().count() > max
      {
        return Err(Error::format(format!(
          "{s:?} is longer than {max} characters"
        )));
      }
      text.into()
    }
    ColumnType::DateTime => bind_datetime(value)?.into(),
    ColumnType::Enum(kind) => {
      let code = bind_text(value)?;
      if let Some(code) = &code {
        kind.check(code)?;
      }
      code.into()
    }
  })
}

/// The read-side pass of a column's coercion, applied to a value as read
/// back from storage.
///
/// Columns without a coercion, and values whose storage class does not match
/// the column, are returned as they are.
pub fn result_value(column: &ColumnDef, stored: Stored) -> Stored {
  match (column.ty, stored) {
    (ColumnType::Uuid, Stored::Text(s)) => UuidCoercion.result(Some(s)).into(),
    (ColumnType::Telephone, Stored::Text(s)) => {
      TelephoneCoercion.result(Some(s)).into()
    }
    (ColumnType::Integer, Stored::Integer(n)) => {
      IntegerCoercion.result(Some(n)).into()
    }
    (_, stored) => stored,
  }
}

fn bind_text(value: Value) -> Result<Option<String>> {
  match value {
    v if v.is_null_like() => Ok(None),
    Value::Text(s) => Ok(Some(s)),
    other => Err(Error::format(format!("expected text, got {}", other.kind()))),
  }
}

fn bind_datetime(value: Value) -> Result<Option<String>> {
  match value {
    v if v.is_null_like() => Ok(None),
    Value::Timestamp(dt) => Ok(Some(encode_dt(dt))),
    Value::Text(s) => decode_dt(&s).map(|dt| Some(encode_dt(dt))),
    other => Err(Error::format(format!(
      "expected timestamp, got {}",
      other.kind()
    ))),
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::terminology::{Modality, Terminology};

  #[test]
  fn defaults_are_generated_per_row() {
    let a = bind_row(Table::MetaRecord, Row::new()).unwrap();
    let b = bind_row(Table::MetaRecord, Row::new()).unwrap();
    assert_ne!(a.id().unwrap(), b.id().unwrap());
    assert!(a.timestamp("entry_date").unwrap().is_some());
    assert!(b.timestamp("entry_date").unwrap().is_some());
  }

  #[test]
  fn supplied_id_is_kept() {
    let id = Uuid::new_v4();
    let row = Row::new().with("id", id.as_bytes().to_vec());
    let bound = bind_row(Table::Patient, row).unwrap();
    assert_eq!(bound.id().unwrap(), id);
  }

  #[test]
  fn nan_id_still_gets_a_default() {
    let row = Row::new().with("id", f64::NAN);
    let bound = bind_row(Table::Payer, row).unwrap();
    assert!(bound.id().is_ok());
  }

  #[test]
  fn columns_follow_declaration_order() {
    let row = Row::new().with("phone", "212-555-0199").with("name", "Mercy");
    let bound = bind_row(Table::Organization, row).unwrap();
    let columns: Vec<_> = bound.values().iter().map(|(c, _)| *c).collect();
    let declared: Vec<_> =
      Table::Organization.def().columns.iter().map(|c| c.name).collect();
    assert_eq!(columns, declared);
    assert_eq!(bound.text("phone").unwrap().as_deref(), Some("2125550199"));
    assert_eq!(bound.text("street").unwrap(), None);
  }

  #[test]
  fn unknown_column_rejected() {
    let row = Row::new().with("shoe_size", 11_i64);
    let err = bind_row(Table::Patient, row).unwrap_err();
    assert!(matches!(err, Error::UnknownColumn { column, .. } if column == "shoe_size"));
  }

  #[test]
  fn coercion_failure_names_its_column() {
    let row = Row::new().with("phone", "555-0100");
    let err = bind_row(Table::Payer, row).unwrap_err();
    assert!(err.is_format());
    assert!(matches!(
      err,
      Error::Field { table: "payer", column: "phone", .. }
    ));
  }

  #[test]
  fn integer_column_accepts_nan_and_text() {
    let encounter_id = Uuid::new_v4();
    let bound = bind_row(
      Table::Medication,
      Row::new()
        .with("encounter_id", encounter_id)
        .with("dispenses", f64::NAN),
    )
    .unwrap();
    assert_eq!(bound.get("dispenses"), Some(&Stored::Null));

    let bound = bind_row(
      Table::Medication,
      Row::new().with("encounter_id", encounter_id).with("dispenses", "42"),
    )
    .unwrap();
    assert_eq!(bound.integer("dispenses").unwrap(), Some(42));

    let err = bind_row(
      Table::Medication,
      Row::new().with("encounter_id", encounter_id).with("dispenses", "abc"),
    )
    .unwrap_err();
    assert!(err.is_format());
  }

  #[test]
  fn varchar_length_enforced() {
    let ok = bind_row(Table::Patient, Row::new().with("state", "NY")).unwrap();
    assert_eq!(ok.text("state").unwrap().as_deref(), Some("NY"));
    let err =
      bind_row(Table::Patient, Row::new().with("zipcode", "100011")).unwrap_err();
    assert!(err.is_format());
  }

  #[test]
  fn enum_columns_accept_only_known_codes() {
    let row = Row::new()
      .with("encounter_id", Uuid::new_v4())
      .with("modality", Modality::Pet)
      .with("term", Terminology::RadLex);
    let bound = bind_row(Table::Imaging, row).unwrap();
    assert_eq!(bound.code::<Modality>("modality").unwrap(), Some(Modality::Pet));

    let row = Row::new().with("modality", "PET");
    assert!(bind_row(Table::Imaging, row).unwrap_err().is_format());
  }

  #[test]
  fn datetime_columns_normalise_text() {
    let row = Row::new().with("birth_date", "1980-06-01");
    let bound = bind_row(Table::Patient, row).unwrap();
    assert_eq!(
      bound.timestamp("birth_date").unwrap(),
      Some(Utc.with_ymd_and_hms(1980, 6, 1, 0, 0, 0).unwrap())
    );
    let row = Row::new().with("birth_date", 1980_i64);
    assert!(bind_row(Table::Patient, row).unwrap_err().is_format());
  }

  #[test]
  fn text_columns_reject_other_kinds() {
    let row = Row::new().with("last_name", 7_i64);
    assert!(bind_row(Table::Patient, row).unwrap_err().is_format());
  }

  #[test]
  fn read_side_returns_values_as_stored() {
    let def = Table::Medication.def();
    for bound in [
      bind_row(
        Table::Medication,
        Row::new().with("encounter_id", Uuid::new_v4()).with("dispenses", 3_i64),
      )
      .unwrap(),
      bind_row(Table::Medication, Row::new()).unwrap(),
    ] {
      for (name, value) in bound.values() {
        let column = def.column(name).unwrap();
        assert_eq!(&result_value(column, value.clone()), value, "{name}");
      }
    }

    let phone = Table::Payer.def().column("phone").unwrap();
    assert_eq!(
      result_value(phone, Stored::Text("2125550199".into())),
      Stored::Text("2125550199".into())
    );
    assert_eq!(result_value(phone, Stored::Null), Stored::Null);
  }

  #[test]
  fn stored_row_serialises_as_object() {
    let row = Row::new().with("code", "44054006").with("description", None::<String>);
    let bound = bind_row(Table::Snomed, row).unwrap();
    let json = serde_json::to_value(&bound).unwrap();
    assert_eq!(json["code"], "44054006");
    assert!(json["description"].is_null());
    assert!(json["id"].is_string());
  }
}
