//! Repository layer: the record backend boundary.
//!
//! # Responsibility
//! - Define the persistence capabilities the store depends on.
//! - Isolate SQLite query details from the store facade.
//!
//! # Invariants
//! - Backend writes enforce `validate()` before persistence.

pub mod record_backend;
