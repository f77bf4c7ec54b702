//! Error types for `healthdb-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A value could not be coerced into its column's canonical form.
  #[error("{0}")]
  Format(String),

  /// A coercion or decoding failure, located at a specific column.
  #[error("{table}.{column}: {source}")]
  Field {
    table:  &'static str,
    column: &'static str,
    #[source]
    source: Box<Error>,
  },

  #[error("unknown column {column:?} for table {table}")]
  UnknownColumn { table: &'static str, column: String },

  #[error("row for {table} has no {column} column")]
  MissingColumn {
    table:  &'static str,
    column: &'static str,
  },
}

impl Error {
  pub(crate) fn format(message: impl Into<String>) -> Self {
    Self::Format(message.into())
  }

  pub(crate) fn at(self, table: &'static str, column: &'static str) -> Self {
    Self::Field { table, column, source: Box::new(self) }
  }

  /// `true` if this error (or the error it wraps) is a format error.
  pub fn is_format(&self) -> bool {
    match self {
      Self::Format(_) => true,
      Self::Field { source, .. } => source.is_format(),
      _ => false,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
