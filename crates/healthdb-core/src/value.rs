//! Input values as handed over by ingestion, and the canonical forms they are
//! stored as.
//!
//! Timestamps are stored as RFC 3339 strings. UUIDs are stored as hyphenated
//! lowercase strings. Integers are stored as 64-bit signed integers.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Value ───────────────────────────────────────────────────────────────────

/// A loosely-typed value before coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Null,
  Int(i64),
  /// A 128-bit unsigned integer, e.g. the integer form of a UUID.
  U128(u128),
  Float(f64),
  Text(String),
  Bytes(Vec<u8>),
  Uuid(Uuid),
  Timestamp(DateTime<Utc>),
}

impl Value {
  /// `true` for SQL NULL and for floating-point NaN, which tabular sources
  /// use as a missing-value marker.
  pub fn is_null_like(&self) -> bool {
    match self {
      Self::Null => true,
      Self::Float(f) => f.is_nan(),
      _ => false,
    }
  }

  /// Short name of the variant, for error messages.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Null => "null",
      Self::Int(_) | Self::U128(_) => "integer",
      Self::Float(_) => "float",
      Self::Text(_) => "text",
      Self::Bytes(_) => "bytes",
      Self::Uuid(_) => "uuid",
      Self::Timestamp(_) => "timestamp",
    }
  }
}

impl From<i64> for Value {
  fn from(n: i64) -> Self { Self::Int(n) }
}

impl From<i32> for Value {
  fn from(n: i32) -> Self { Self::Int(n.into()) }
}

impl From<u32> for Value {
  fn from(n: u32) -> Self { Self::Int(n.into()) }
}

impl From<u128> for Value {
  fn from(n: u128) -> Self { Self::U128(n) }
}

impl From<f64> for Value {
  fn from(f: f64) -> Self { Self::Float(f) }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

impl From<String> for Value {
  fn from(s: String) -> Self { Self::Text(s) }
}

impl From<Vec<u8>> for Value {
  fn from(b: Vec<u8>) -> Self { Self::Bytes(b) }
}

impl From<&[u8]> for Value {
  fn from(b: &[u8]) -> Self { Self::Bytes(b.to_vec()) }
}

impl From<Uuid> for Value {
  fn from(id: Uuid) -> Self { Self::Uuid(id) }
}

impl From<DateTime<Utc>> for Value {
  fn from(dt: DateTime<Utc>) -> Self { Self::Timestamp(dt) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(opt: Option<T>) -> Self { opt.map_or(Self::Null, Into::into) }
}

// ─── Stored ──────────────────────────────────────────────────────────────────

/// The canonical storage form of a column value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Stored {
  Null,
  Integer(i64),
  Text(String),
}

impl From<Option<String>> for Stored {
  fn from(opt: Option<String>) -> Self { opt.map_or(Self::Null, Self::Text) }
}

impl From<Option<i64>> for Stored {
  fn from(opt: Option<i64>) -> Self { opt.map_or(Self::Null, Self::Integer) }
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

/// Parse a stored or ingested timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS` (taken as
/// UTC) and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  let s = s.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.with_timezone(&Utc));
  }
  for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
      return Ok(naive.and_utc());
    }
  }
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|naive| naive.and_utc())
    .ok_or_else(|| Error::format(format!("invalid date/time: {s:?}")))
}
