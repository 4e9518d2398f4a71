//! Domain model for the salary store.
//!
//! # Responsibility
//! - Define the canonical employee record and its insert payload.
//!
//! # Invariants
//! - Every stored record has a non-empty type and a finite salary.

pub mod employee;
