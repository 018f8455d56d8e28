//! Repository layer: data access contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the persistence contract for student records.
//! - Keep SQL details out of model and service code.
//!
//! # Invariants
//! - Repository writes enforce `Student::validate()` before persistence.
//! - Repository APIs return semantic outcomes (`Conflict`, `NotFound`) as
//!   distinct variants next to transport errors.

pub mod student_repo;
