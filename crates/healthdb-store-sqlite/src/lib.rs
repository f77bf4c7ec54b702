//! SQLite backend for the clinical data model.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The DDL is generated from the
//! declarations in [`healthdb_core::schema`], so NOT NULL, uniqueness,
//! referential integrity and the column format checks are enforced by SQLite.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use schema::ddl;
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
