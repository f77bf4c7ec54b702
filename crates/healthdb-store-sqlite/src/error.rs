//! Error type for `healthdb-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] healthdb_core::Error),

  /// NOT NULL, UNIQUE, CHECK or FOREIGN KEY rejected a write.
  #[error("constraint violation: {0}")]
  Constraint(String),

  #[error("database error: {0}")]
  Database(#[source] tokio_rusqlite::Error),

  /// A column held a storage class the model never writes.
  #[error("unexpected {kind} value in {table}.{column}")]
  UnexpectedValue {
    table:  &'static str,
    column: &'static str,
    kind:   &'static str,
  },
}

impl Error {
  pub fn is_constraint(&self) -> bool { matches!(self, Self::Constraint(_)) }
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    match e {
      tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
        failure,
        message,
      )) if failure.code == rusqlite::ErrorCode::ConstraintViolation => {
        Self::Constraint(message.unwrap_or_else(|| failure.to_string()))
      }
      other => Self::Database(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
