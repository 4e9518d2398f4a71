//! Core of the employee salary store.
//! Owns the record model, the persistence boundary and the store facade.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::employee::{
    Employee, EmployeeId, EmployeeValidationError, NewEmployee, DEFAULT_EMPLOYEE_TYPE, SALARY_RANGE,
};
pub use repo::record_backend::{
    AggregateFunction, AggregateQuery, AggregateRow, EmployeeFilter, EmployeeListQuery, GroupField,
    NumericField, RecordBackend, RepoError, RepoResult, SortDirection, SortField,
    SqliteRecordBackend,
};
pub use service::employee_store::{EmployeeStore, SalarySummary, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
