//! The `ClinicalStore` trait.
//!
//! Implemented by storage backends (e.g. `healthdb-store-sqlite`). The binder
//! in [`crate::row`] produces canonical values; the backend persists them and
//! enforces NOT NULL, uniqueness and referential integrity.

use std::future::Future;

use uuid::Uuid;

use crate::{
  entity::Entity,
  row::{Row, StoredRow},
  schema::{Navigation, Table},
};

/// Abstraction over a clinical data store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait ClinicalStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + From<crate::Error> + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Bind `row` against `table` and persist it, returning its primary key.
  ///
  /// Every referenced parent row must already exist.
  fn insert(
    &self,
    table: Table,
    row: Row,
  ) -> impl Future<Output = Result<Uuid, Self::Error>> + Send + '_;

  /// Persist several rows atomically. Foreign keys are checked once, when
  /// the batch commits, so the rows may be given in any order.
  fn insert_batch(
    &self,
    rows: Vec<(Table, Row)>,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  /// Persist a typed record.
  fn insert_entity<E: Entity + Send + 'static>(
    &self,
    entity: E,
  ) -> impl Future<Output = Result<Uuid, Self::Error>> + Send + '_ {
    self.insert(E::TABLE, entity.into_row())
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Fetch a row by primary key. Returns `None` if not found.
  fn get(
    &self,
    table: Table,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<StoredRow>, Self::Error>> + Send + '_;

  fn get_entity<E: Entity + Send + 'static>(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<E>, Self::Error>> + Send + '_ {
    async move {
      let row = self.get(E::TABLE, id).await?;
      Ok(row.as_ref().map(E::from_stored).transpose()?)
    }
  }

  /// Walk `navigation` from the row `id` of its source table.
  ///
  /// Towards children this yields every row referencing `id`; towards the
  /// parent it yields at most one row.
  fn follow(
    &self,
    navigation: Navigation,
    id: Uuid,
  ) -> impl Future<Output = Result<Vec<StoredRow>, Self::Error>> + Send + '_;

  fn count(
    &self,
    table: Table,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
