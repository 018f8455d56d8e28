//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into UI-facing registry flows.
//! - Keep callers decoupled from storage details.

pub mod student_service;
