//! [`SqliteStore`]: the SQLite implementation of [`ClinicalStore`].

use std::path::Path;

use healthdb_core::{
  row::{Row, StoredRow, bind_row},
  schema::{Direction, Navigation, Table},
  store::ClinicalStore,
};
use rusqlite::{OptionalExtension as _, params_from_iter, types::Value as SqlValue};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  Result,
  encode::{RawRow, encode_row},
  schema::{ddl, insert_sql, select_columns},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A clinical data store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_owned();
    let conn = tokio_rusqlite::Connection::open(&path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    info!(path = %path.display(), "opened clinical store");
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    let schema = ddl();
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&schema)?;
        Ok(())
      })
      .await?;
    debug!("schema initialised");
    Ok(())
  }

  /// Run a `SELECT` yielding full rows of `table` and decode them.
  async fn select(
    &self,
    table: Table,
    sql: String,
    id: Uuid,
  ) -> Result<Vec<StoredRow>> {
    let width = table.def().columns.len();
    let id_str = id.hyphenated().to_string();

    let raws: Vec<RawRow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| RawRow::read(row, width))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(|raw| raw.into_stored(table)).collect()
  }
}

// ─── ClinicalStore impl ──────────────────────────────────────────────────────

impl ClinicalStore for SqliteStore {
  type Error = crate::Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn insert(&self, table: Table, row: Row) -> Result<Uuid> {
    let bound = bind_row(table, row)?;
    let id = bound.id()?;
    let sql = insert_sql(table);
    let params = encode_row(&bound);

    self
      .conn
      .call(move |conn| {
        conn.execute(&sql, params_from_iter(params))?;
        Ok(())
      })
      .await?;

    debug!(%table, %id, "inserted row");
    Ok(id)
  }

  async fn insert_batch(&self, rows: Vec<(Table, Row)>) -> Result<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(rows.len());
    let mut statements: Vec<(String, Vec<SqlValue>)> =
      Vec::with_capacity(rows.len());
    for (table, row) in rows {
      let bound = bind_row(table, row)?;
      ids.push(bound.id()?);
      statements.push((insert_sql(table), encode_row(&bound)));
    }
    let len = statements.len();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // Resets at commit; references are only checked then.
        tx.execute_batch("PRAGMA defer_foreign_keys = ON;")?;
        for (sql, params) in statements {
          tx.execute(&sql, params_from_iter(params))?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    debug!(rows = len, "committed batch");
    Ok(ids)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get(&self, table: Table, id: Uuid) -> Result<Option<StoredRow>> {
    let sql = format!(
      "SELECT {} FROM \"{}\" WHERE \"id\" = ?1",
      select_columns(table, None),
      table.name()
    );
    let width = table.def().columns.len();
    let id_str = id.hyphenated().to_string();

    let raw: Option<RawRow> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], |row| {
              RawRow::read(row, width)
            })
            .optional()?,
        )
      })
      .await?;

    raw.map(|raw| raw.into_stored(table)).transpose()
  }

  async fn follow(
    &self,
    navigation: Navigation,
    id: Uuid,
  ) -> Result<Vec<StoredRow>> {
    let relation = navigation.relation;
    let target = navigation.target();

    let sql = match navigation.direction {
      Direction::ToChildren => format!(
        "SELECT {} FROM \"{}\" WHERE \"{}\" = ?1 ORDER BY rowid",
        select_columns(target, None),
        relation.child,
        relation.foreign_key,
      ),
      Direction::ToParent => format!(
        "SELECT {} FROM \"{}\" AS p JOIN \"{}\" AS c ON c.\"{}\" = p.\"id\" \
         WHERE c.\"id\" = ?1",
        select_columns(target, Some("p")),
        relation.parent,
        relation.child,
        relation.foreign_key,
      ),
    };

    let rows = self.select(target, sql, id).await?;
    debug!(
      from = %navigation.source(),
      via = navigation.name(),
      %id,
      found = rows.len(),
      "followed relation"
    );
    Ok(rows)
  }

  async fn count(&self, table: Table) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM \"{}\"", table.name());
    let n: i64 = self
      .conn
      .call(move |conn| Ok(conn.query_row(&sql, [], |row| row.get(0))?))
      .await?;
    Ok(u64::try_from(n).unwrap_or_default())
  }
}
