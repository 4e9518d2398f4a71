//! Employee domain model.
//!
//! # Responsibility
//! - Define the single record type held by the salary store.
//! - Own the random salary policy used when a record is added.
//!
//! # Invariants
//! - `id` is assigned by the backend on insert and never reused.
//! - `kind` is never empty.
//! - `salary` is always a finite number.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::Range;
use uuid::Uuid;

/// Stable identifier of one stored employee record.
pub type EmployeeId = Uuid;

/// Type label written for every record created through the add operation.
pub const DEFAULT_EMPLOYEE_TYPE: &str = "Employee";

/// Half-open range random salaries are drawn from.
pub const SALARY_RANGE: Range<f64> = 60_000.0..140_000.0;

/// Persisted employee record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    /// Serialized as `type` to match the stored column name.
    #[serde(rename = "type")]
    pub kind: String,
    pub salary: f64,
}

impl Employee {
    /// Checks record invariants before persistence and after reads.
    pub fn validate(&self) -> Result<(), EmployeeValidationError> {
        validate_fields(&self.kind, self.salary)
    }
}

/// Insert payload; the backend assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEmployee {
    #[serde(rename = "type")]
    pub kind: String,
    pub salary: f64,
}

impl NewEmployee {
    pub fn new(kind: impl Into<String>, salary: f64) -> Self {
        Self {
            kind: kind.into(),
            salary,
        }
    }

    /// Builds a default-typed record with a salary drawn from `SALARY_RANGE`.
    pub fn random<G: Rng>(rng: &mut G) -> Self {
        Self::new(DEFAULT_EMPLOYEE_TYPE, rng.gen_range(SALARY_RANGE))
    }

    pub fn validate(&self) -> Result<(), EmployeeValidationError> {
        validate_fields(&self.kind, self.salary)
    }

    /// Attaches a backend-assigned id.
    pub fn into_employee(self, id: EmployeeId) -> Employee {
        Employee {
            id,
            kind: self.kind,
            salary: self.salary,
        }
    }
}

/// Validation failures for employee fields.
#[derive(Debug, Clone, PartialEq)]
pub enum EmployeeValidationError {
    EmptyType,
    NonFiniteSalary(f64),
}

impl Display for EmployeeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyType => write!(f, "employee type must not be empty"),
            Self::NonFiniteSalary(value) => {
                write!(f, "employee salary must be a finite number, got {value}")
            }
        }
    }
}

impl Error for EmployeeValidationError {}

fn validate_fields(kind: &str, salary: f64) -> Result<(), EmployeeValidationError> {
    if kind.trim().is_empty() {
        return Err(EmployeeValidationError::EmptyType);
    }
    if !salary.is_finite() {
        return Err(EmployeeValidationError::NonFiniteSalary(salary));
    }
    Ok(())
}
