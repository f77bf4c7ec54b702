//! Core types for the healthdb clinical record model.
//!
//! Two layers live here: the value coercion layer ([`coerce`]), which turns
//! loosely-typed ingestion values into canonical storage forms, and the
//! entity/relationship layer ([`schema`], [`entity`]), which declares the
//! tables, columns, constraints and navigable relationships.
//!
//! This crate has no database dependencies. Storage engines implement
//! [`store::ClinicalStore`] and enforce the declared constraints.

pub mod coerce;
pub mod entity;
pub mod error;
pub mod row;
pub mod schema;
pub mod store;
pub mod terminology;
pub mod value;

pub use error::{Error, Result};
