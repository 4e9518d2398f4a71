//! Store-level services.
//!
//! # Responsibility
//! - Turn backend calls into the statistics and mutations callers use.
//! - Keep presentation layers decoupled from storage details.

pub mod employee_store;
