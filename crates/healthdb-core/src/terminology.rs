//! Enumerated code columns: coding terminologies, provider degrees and imaging
//! modalities.
//!
//! Each enum is stored as its code string (e.g. `"SNOMED_CT"`, `"PT"`), which
//! is also what `Display`, `FromStr` and serde use.

use serde::{Deserialize, Serialize};
use strum::{
  AsRefStr, Display, EnumIter, EnumString, IntoStaticStr, VariantNames,
};

use crate::{Error, Result, value::Value};

/// A coding system used to encode a clinical concept's `code` column.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
  VariantNames,
)]
pub enum Terminology {
  #[serde(rename = "SNOMED_CT")]
  #[strum(serialize = "SNOMED_CT")]
  Snomed,
  #[serde(rename = "LOINC")]
  #[strum(serialize = "LOINC")]
  Loinc,
  #[serde(rename = "UCUM")]
  #[strum(serialize = "UCUM")]
  Ucum,
  #[serde(rename = "ICD9")]
  #[strum(serialize = "ICD9")]
  Icd9,
  #[serde(rename = "ICD10")]
  #[strum(serialize = "ICD10")]
  Icd10,
  #[serde(rename = "CPT")]
  #[strum(serialize = "CPT")]
  Cpt,
  #[serde(rename = "MEDCIN")]
  #[strum(serialize = "MEDCIN")]
  Medcin,
  #[serde(rename = "RXNORM")]
  #[strum(serialize = "RXNORM")]
  RxNorm,
  #[serde(rename = "NDC")]
  #[strum(serialize = "NDC")]
  Ndc,
  #[serde(rename = "HCPCS")]
  #[strum(serialize = "HCPCS")]
  Hcpcs,
  #[serde(rename = "RADLEX")]
  #[strum(serialize = "RADLEX")]
  RadLex,
}

/// A provider's clinical degree.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
  VariantNames,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Degree {
  Md,
  Do,
  Np,
  Mbbs,
  Pa,
}

/// The acquisition modality of an imaging study (DICOM modality codes).
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
  VariantNames,
)]
pub enum Modality {
  #[serde(rename = "CT")]
  #[strum(serialize = "CT")]
  Ct,
  #[serde(rename = "MR")]
  #[strum(serialize = "MR")]
  Mr,
  /// Positron emission tomography.
  #[serde(rename = "PT")]
  #[strum(serialize = "PT")]
  Pet,
  #[serde(rename = "XR")]
  #[strum(serialize = "XR")]
  Xr,
  #[serde(rename = "US")]
  #[strum(serialize = "US")]
  Us,
  #[serde(rename = "DX")]
  #[strum(serialize = "DX")]
  Dx,
  #[serde(rename = "CR")]
  #[strum(serialize = "CR")]
  Cr,
}

macro_rules! code_into_value {
  ($($ty:ty),*) => {$(
    impl From<$ty> for Value {
      fn from(code: $ty) -> Self { Self::Text(code.as_ref().to_owned()) }
    }
  )*};
}

code_into_value!(Terminology, Degree, Modality);

// ─── EnumKind ────────────────────────────────────────────────────────────────

/// Which enumeration an `Enum` column is constrained to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumKind {
  Terminology,
  Degree,
  Modality,
}

impl EnumKind {
  /// Every code string the column accepts.
  pub fn codes(self) -> &'static [&'static str] {
    match self {
      Self::Terminology => Terminology::VARIANTS,
      Self::Degree => Degree::VARIANTS,
      Self::Modality => Modality::VARIANTS,
    }
  }

  /// Fail with a format error unless `code` is one of [`Self::codes`].
  pub fn check(self, code: &str) -> Result<()> {
    if self.codes().contains(&code) {
      Ok(())
    } else {
      Err(Error::format(format!("unknown {self:?} code {code:?}")))
    }
  }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn codes_match_display() {
    for t in Terminology::iter() {
      assert!(EnumKind::Terminology.codes().contains(&t.as_ref()));
      assert_eq!(Terminology::from_str(&t.to_string()).unwrap(), t);
    }
    for d in Degree::iter() {
      assert!(EnumKind::Degree.check(d.as_ref()).is_ok());
    }
    for m in Modality::iter() {
      assert!(EnumKind::Modality.check(m.into()).is_ok());
    }
  }

  #[test]
  fn stored_codes() {
    assert_eq!(Terminology::Snomed.as_ref(), "SNOMED_CT");
    assert_eq!(Terminology::Icd10.as_ref(), "ICD10");
    assert_eq!(Degree::Mbbs.as_ref(), "MBBS");
    assert_eq!(Modality::Pet.as_ref(), "PT");
    assert_eq!(EnumKind::Modality.codes().len(), 7);
    assert_eq!(EnumKind::Terminology.codes().len(), 11);
  }

  #[test]
  fn serde_uses_codes() {
    let json = serde_json::to_string(&Terminology::RxNorm).unwrap();
    assert_eq!(json, "\"RXNORM\"");
    let degree: Degree = serde_json::from_str("\"DO\"").unwrap();
    assert_eq!(degree, Degree::Do);
  }

  #[test]
  fn unknown_code_is_format_error() {
    assert!(EnumKind::Modality.check("PET").unwrap_err().is_format());
    assert!(EnumKind::Degree.check("md").unwrap_err().is_format());
  }

  #[test]
  fn codes_become_text_values() {
    assert_eq!(Value::from(Modality::Pet), Value::Text("PT".into()));
  }
}
