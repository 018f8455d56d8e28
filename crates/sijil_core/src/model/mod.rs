//! Domain model for the student registry.
//!
//! # Responsibility
//! - Define the canonical student record and its validity rules.
//! - Parse raw form-style input into typed domain values.
//!
//! # Invariants
//! - Enrollment status is a closed set; free-form status strings never reach
//!   persistence or search.
//! - Validity checks are pure functions with no storage access.
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod form;
pub mod student;
