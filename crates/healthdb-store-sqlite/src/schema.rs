//! SQL generated from the table declarations.
//!
//! Executed once at connection startup. Every statement is idempotent, and
//! tables are created in insertion order so each `REFERENCES` names a table
//! that already exists.

use std::fmt::Write as _;

use healthdb_core::schema::{
  ColumnDef, ColumnType, Table, TableDef, insertion_order,
};

pub const SCHEMA_VERSION: u32 = 1;

/// Full schema DDL for every declared table.
pub fn ddl() -> String {
  let mut sql = String::from(
    "PRAGMA journal_mode = WAL;\nPRAGMA foreign_keys = ON;\n",
  );

  for table in insertion_order() {
    let def = table.def();
    sql.push('\n');
    sql.push_str(&create_table(def));
    for (column, _) in def.foreign_keys() {
      let _ = writeln!(
        sql,
        "CREATE INDEX IF NOT EXISTS \"{t}_{c}_idx\" ON \"{t}\"(\"{c}\");",
        t = def.name(),
        c = column.name,
      );
    }
  }

  let _ = write!(sql, "\nPRAGMA user_version = {SCHEMA_VERSION};\n");
  sql
}

fn create_table(def: &TableDef) -> String {
  let columns: Vec<String> =
    def.columns.iter().map(column_sql).collect();
  format!(
    "CREATE TABLE IF NOT EXISTS \"{}\" (\n    {}\n);\n",
    def.name(),
    columns.join(",\n    ")
  )
}

fn column_sql(column: &ColumnDef) -> String {
  let name = column.name;
  let affinity = match column.ty {
    ColumnType::Integer => "INTEGER",
    _ => "TEXT",
  };
  let mut sql = format!("\"{name}\" {affinity}");

  if column.primary_key {
    sql.push_str(" PRIMARY KEY");
  }
  if !column.nullable {
    sql.push_str(" NOT NULL");
  }
  if column.unique {
    sql.push_str(" UNIQUE");
  }
  if let Some(parent) = column.references {
    let pk = parent.def().primary_key().name;
    let _ = write!(sql, " REFERENCES \"{parent}\"(\"{pk}\")");
  }

  match column.ty {
    ColumnType::Telephone => {
      let _ = write!(
        sql,
        " CHECK (length(\"{name}\") = 10 AND \"{name}\" NOT GLOB '*[^0-9]*')"
      );
    }
    ColumnType::VarChar(max) => {
      let _ = write!(sql, " CHECK (length(\"{name}\") <= {max})");
    }
    ColumnType::Enum(kind) => {
      let codes: Vec<String> =
        kind.codes().iter().map(|c| format!("'{c}'")).collect();
      let _ = write!(sql, " CHECK (\"{name}\" IN ({}))", codes.join(", "));
    }
    ColumnType::Uuid
    | ColumnType::Integer
    | ColumnType::Text
    | ColumnType::DateTime => {}
  }

  sql
}

// ─── Statements ──────────────────────────────────────────────────────────────

/// Quoted column list for `table`, in declaration order, optionally
/// qualified with a table alias.
pub fn select_columns(table: Table, alias: Option<&str>) -> String {
  let prefix = alias.map(|a| format!("{a}.")).unwrap_or_default();
  table
    .def()
    .columns
    .iter()
    .map(|c| format!("{prefix}\"{}\"", c.name))
    .collect::<Vec<_>>()
    .join(", ")
}

/// `INSERT` taking every column of `table` as positional parameters.
pub fn insert_sql(table: Table) -> String {
  let def = table.def();
  let placeholders: Vec<String> =
    (1..=def.columns.len()).map(|i| format!("?{i}")).collect();
  format!(
    "INSERT INTO \"{}\" ({}) VALUES ({})",
    def.name(),
    select_columns(table, None),
    placeholders.join(", ")
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parents_are_created_before_children() {
    let sql = ddl();
    let at = |table: &str| {
      sql
        .find(&format!("CREATE TABLE IF NOT EXISTS \"{table}\""))
        .unwrap()
    };
    assert!(at("patient") < at("encounter"));
    assert!(at("encounter") < at("condition"));
    assert!(at("condition") < at("medication"));
  }

  #[test]
  fn encounter_columns_carry_constraints() {
    let sql = ddl();
    assert!(sql.contains(
      "\"patient_id\" TEXT NOT NULL REFERENCES \"patient\"(\"id\")"
    ));
    assert!(sql.contains("\"external_id\" TEXT UNIQUE"));
    assert!(sql.contains("\"id\" TEXT PRIMARY KEY NOT NULL"));
    assert!(sql.contains("'SNOMED_CT'"));
    assert!(sql.contains("\"state\" TEXT CHECK (length(\"state\") <= 2)"));
  }

  #[test]
  fn meta_target_has_no_reference() {
    let sql = ddl();
    assert!(sql.contains("\"target_id\" TEXT\n);"));
  }

  #[test]
  fn insert_lists_every_column() {
    let sql = insert_sql(Table::Snomed);
    assert_eq!(
      sql,
      "INSERT INTO \"snomed\" (\"id\", \"code\", \"description\") VALUES (?1, ?2, ?3)"
    );
  }
}
