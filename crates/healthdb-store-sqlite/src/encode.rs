//! Conversion between canonical [`Stored`] values and SQLite values.
//!
//! The binder only ever produces NULL, INTEGER and TEXT, so those are the only
//! storage classes accepted back. UUIDs and timestamps are already text by
//! the time they reach this module.

use healthdb_core::{
  row::{StoredRow, result_value},
  schema::{Table, TableDef},
  value::Stored,
};
use rusqlite::types::Value as SqlValue;

use crate::{Error, Result};

pub fn encode_stored(value: &Stored) -> SqlValue {
  match value {
    Stored::Null => SqlValue::Null,
    Stored::Integer(n) => SqlValue::Integer(*n),
    Stored::Text(s) => SqlValue::Text(s.clone()),
  }
}

/// Parameters for [`insert_sql`](crate::schema::insert_sql), in declaration
/// order.
pub fn encode_row(row: &StoredRow) -> Vec<SqlValue> {
  row.values().iter().map(|(_, v)| encode_stored(v)).collect()
}

/// A row as selected by [`select_columns`](crate::schema::select_columns),
/// before decoding.
pub struct RawRow(pub Vec<SqlValue>);

impl RawRow {
  pub fn read(row: &rusqlite::Row<'_>, width: usize) -> rusqlite::Result<Self> {
    (0..width).map(|i| row.get(i)).collect::<rusqlite::Result<_>>().map(Self)
  }

  pub fn into_stored(self, table: Table) -> Result<StoredRow> {
    let def: &'static TableDef = table.def();
    let values = def
      .columns
      .iter()
      .zip(self.0)
      .map(|(column, value)| {
        let stored = match value {
          SqlValue::Null => Stored::Null,
          SqlValue::Integer(n) => Stored::Integer(n),
          SqlValue::Text(s) => Stored::Text(s),
          SqlValue::Real(_) => return Err(unexpected(def, column.name, "real")),
          SqlValue::Blob(_) => return Err(unexpected(def, column.name, "blob")),
        };
        Ok((column.name, result_value(column, stored)))
      })
      .collect::<Result<_>>()?;
    Ok(StoredRow::new(table, values))
  }
}

fn unexpected(def: &TableDef, column: &'static str, kind: &'static str) -> Error {
  Error::UnexpectedValue { table: def.name(), column, kind }
}

#[cfg(test)]
mod tests {
  use healthdb_core::row::{Row, bind_row};

  use super::*;

  #[test]
  fn encode_keeps_declaration_order() {
    let row = Row::new().with("code", "44054006");
    let bound = bind_row(Table::Snomed, row).unwrap();
    let params = encode_row(&bound);
    assert_eq!(params.len(), 3);
    assert!(matches!(&params[0], SqlValue::Text(_)));
    assert_eq!(params[1], SqlValue::Text("44054006".into()));
    assert_eq!(params[2], SqlValue::Null);
  }

  #[test]
  fn decoded_rows_keep_stored_values() {
    let id = "a8098c1a-f86e-11da-bd1a-00112444be1e";
    let raw = RawRow(vec![
      SqlValue::Text(id.into()),
      SqlValue::Text("Mercy General".into()),
      SqlValue::Null,
      SqlValue::Null,
      SqlValue::Text("NY".into()),
      SqlValue::Null,
      SqlValue::Text("2125550199".into()),
    ]);
    let row = raw.into_stored(Table::Organization).unwrap();
    assert_eq!(row.id().unwrap().to_string(), id);
    assert_eq!(row.get("phone"), Some(&Stored::Text("2125550199".into())));
    assert_eq!(row.get("street"), Some(&Stored::Null));
  }

  #[test]
  fn real_values_are_rejected() {
    let raw = RawRow(vec![
      SqlValue::Text("00000000-0000-0000-0000-000000000000".into()),
      SqlValue::Real(1.5),
      SqlValue::Null,
    ]);
    let err = raw.into_stored(Table::Snomed).unwrap_err();
    assert!(matches!(
      err,
      Error::UnexpectedValue { table: "snomed", column: "code", kind: "real" }
    ));
  }
}
