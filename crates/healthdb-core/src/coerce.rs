//! Field coercions: the bind-side normalisation applied to a value before it
//! is written, and the result-side pass-through applied after it is read.
//!
//! Every coercion maps null-like input (NULL or NaN) to a stored NULL and
//! fails with [`Error::Format`] on input it cannot represent canonically. No
//! coercion holds state; all of them are safe to call concurrently.

use uuid::Uuid;

use crate::{Error, Result, value::Value};

/// A bind/result pair for one column type.
pub trait Coercion {
  /// The canonical storage form.
  type Output;

  /// Normalise `value` for storage. `Ok(None)` means store NULL.
  fn bind(&self, value: Value) -> Result<Option<Self::Output>>;

  /// Stored values are returned to callers exactly as stored.
  fn result(&self, stored: Option<Self::Output>) -> Option<Self::Output> {
    stored
  }
}

// ─── UUID ────────────────────────────────────────────────────────────────────

/// Coerces identifiers to the hyphenated lowercase UUID string.
///
/// Bytes are read as the 16-byte binary form, integers as the 128-bit value,
/// and strings in any form [`Uuid::try_parse`] accepts.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidCoercion;

impl Coercion for UuidCoercion {
  type Output = String;

  fn bind(&self, value: Value) -> Result<Option<String>> {
    if value.is_null_like() {
      return Ok(None);
    }
    let id = match value {
      Value::Uuid(id) => id,
      Value::Bytes(bytes) => Uuid::from_slice(&bytes).map_err(|e| {
        Error::format(format!("invalid uuid bytes ({} bytes): {e}", bytes.len()))
      })?,
      Value::Int(n) => u128::try_from(n)
        .map(Uuid::from_u128)
        .map_err(|_| Error::format(format!("negative integer {n} is not a uuid")))?,
      Value::U128(n) => Uuid::from_u128(n),
      Value::Text(s) => Uuid::try_parse(&s)
        .map_err(|e| Error::format(format!("invalid uuid {s:?}: {e}")))?,
      other => {
        return Err(Error::format(format!(
          "cannot coerce {} to uuid",
          other.kind()
        )));
      }
    };
    Ok(Some(id.hyphenated().to_string()))
  }
}

// ─── Integer ─────────────────────────────────────────────────────────────────

/// Coerces to a nullable 64-bit integer. Conversions must be lossless: `3.0`
/// is accepted, `3.5` is not.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerCoercion;

impl Coercion for IntegerCoercion {
  type Output = i64;

  fn bind(&self, value: Value) -> Result<Option<i64>> {
    if value.is_null_like() {
      return Ok(None);
    }
    let n = match value {
      Value::Int(n) => n,
      Value::U128(n) => i64::try_from(n)
        .map_err(|_| Error::format(format!("integer {n} is out of range")))?,
      Value::Float(f) => float_to_i64(f)?,
      Value::Text(s) => s
        .trim()
        .parse::<i64>()
        .map_err(|e| Error::format(format!("{s:?} is not an integer: {e}")))?,
      other => {
        return Err(Error::format(format!(
          "cannot coerce {} to integer",
          other.kind()
        )));
      }
    };
    Ok(Some(n))
  }
}

fn float_to_i64(f: f64) -> Result<i64> {
  // i64::MAX is not representable as f64; 2^63 is the first value past it.
  const LIMIT: f64 = 9_223_372_036_854_775_808.0;
  if f.is_finite() && f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f) {
    Ok(f as i64)
  } else {
    Err(Error::format(format!("{f} is not an integer")))
  }
}

// ─── Telephone ───────────────────────────────────────────────────────────────

/// Message carried by every telephone format failure.
pub const BAD_CONTACT_FORMAT: &str = "bad contact field formatting";

/// Coerces phone numbers to exactly ten ASCII digits.
///
/// Formatting characters are stripped and a leading US country code `1` is
/// dropped from eleven-digit numbers. Anything that does not then have ten
/// digits is rejected, never truncated or padded.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelephoneCoercion;

impl Coercion for TelephoneCoercion {
  type Output = String;

  fn bind(&self, value: Value) -> Result<Option<String>> {
    if value.is_null_like() {
      return Ok(None);
    }
    let digits = match value {
      Value::Text(s) => s.chars().filter(char::is_ascii_digit).collect::<String>(),
      Value::Int(n) => n.to_string(),
      Value::U128(n) => n.to_string(),
      other => {
        return Err(Error::format(format!(
          "{BAD_CONTACT_FORMAT}: cannot coerce {} to telephone",
          other.kind()
        )));
      }
    };
    let digits = if digits.len() == 11 && digits.starts_with('1') {
      digits[1..].to_owned()
    } else {
      digits
    };
    // A negative integer renders with a sign, so check the characters too.
    if digits.len() != 10 || !digits.bytes().all(|b| b.is_ascii_digit()) {
      return Err(Error::format(BAD_CONTACT_FORMAT));
    }
    Ok(Some(digits))
  }
}
