//! Employee store facade.
//!
//! # Responsibility
//! - Expose the aggregate statistics and mutations the presentation layer
//!   needs, on top of one injected `RecordBackend`.
//! - Apply the per-operation failure policy.
//!
//! # Invariants
//! - Aggregate reads never surface errors: failures degrade to `0` / `0.0`.
//! - `delete_all` never surfaces errors: failures are a logged no-op.
//! - `add_employee` and `delete_employees` surface `StoreError::Persistence`.
//! - The store adds no locking of its own; the backend arbitrates access.

use crate::model::employee::{Employee, EmployeeId, NewEmployee};
use crate::repo::record_backend::{
    AggregateFunction, AggregateQuery, EmployeeFilter, EmployeeListQuery, GroupField,
    NumericField, RecordBackend, RepoError,
};
use log::{debug, info, warn};
use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// Recoverable store failure.
///
/// Raised only by list, add and delete-by-id paths.
#[derive(Debug)]
pub enum StoreError {
    Persistence(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persistence(err) => write!(f, "persistence failed: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Persistence(value)
    }
}

/// Aggregate statistics block shown above the employee list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SalarySummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub sum: f64,
}

/// Facade over a record backend holding employee records.
pub struct EmployeeStore<B: RecordBackend> {
    backend: B,
}

impl<B: RecordBackend> EmployeeStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Borrow the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Number of stored records; `0` when the query fails.
    pub fn count(&self) -> u64 {
        match self.backend.count(&EmployeeFilter::all()) {
            Ok(count) => count,
            Err(err) => {
                warn!("event=store_count module=store status=fallback error={err}");
                0
            }
        }
    }

    pub fn min_salary(&self) -> f64 {
        self.salary_aggregate(AggregateFunction::Min)
    }

    pub fn max_salary(&self) -> f64 {
        self.salary_aggregate(AggregateFunction::Max)
    }

    pub fn average_salary(&self) -> f64 {
        self.salary_aggregate(AggregateFunction::Average)
    }

    pub fn sum_salary(&self) -> f64 {
        self.salary_aggregate(AggregateFunction::Sum)
    }

    /// All five statistics, each with its own fallback.
    pub fn summary(&self) -> SalarySummary {
        SalarySummary {
            count: self.count(),
            min: self.min_salary(),
            max: self.max_salary(),
            average: self.average_salary(),
            sum: self.sum_salary(),
        }
    }

    /// Statistics per record type, ordered by type.
    ///
    /// Returns an empty list when any grouped query fails.
    pub fn summary_by_type(&self) -> Vec<(String, SalarySummary)> {
        match self.try_summary_by_type() {
            Ok(groups) => groups,
            Err(err) => {
                warn!("event=store_summary_by_type module=store status=fallback error={err}");
                Vec::new()
            }
        }
    }

    /// All records in ascending salary order.
    pub fn list_all(&self) -> StoreResult<Vec<Employee>> {
        Ok(self.backend.list(&EmployeeListQuery::default())?)
    }

    /// Persists one default-typed record with a random salary.
    pub fn add_employee(&self) -> StoreResult<Employee> {
        self.add_employee_with_rng(&mut rand::thread_rng())
    }

    /// Same as `add_employee` with a caller-supplied random source.
    pub fn add_employee_with_rng<G: Rng>(&self, rng: &mut G) -> StoreResult<Employee> {
        let started_at = Instant::now();
        let employee = self
            .backend
            .insert(&NewEmployee::random(rng))
            .map_err(|err| {
                warn!(
                    "event=store_add module=store status=error duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                StoreError::from(err)
            })?;

        info!(
            "event=store_add module=store status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(employee)
    }

    /// Removes the named records. Ids not present are ignored.
    pub fn delete_employees(&self, ids: &HashSet<EmployeeId>) -> StoreResult<()> {
        let started_at = Instant::now();
        let removed = self.backend.delete_by_ids(ids).map_err(|err| {
            warn!(
                "event=store_delete module=store status=error requested={} error={err}",
                ids.len()
            );
            StoreError::from(err)
        })?;

        info!(
            "event=store_delete module=store status=ok requested={} removed={removed} duration_ms={}",
            ids.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Batch-deletes every record. Backend failure leaves the store untouched.
    pub fn delete_all(&self) {
        match self.backend.delete_matching(&EmployeeFilter::all()) {
            Ok(removed) => info!(
                "event=store_delete_all module=store status=ok removed={}",
                removed.len()
            ),
            Err(err) => warn!("event=store_delete_all module=store status=fallback error={err}"),
        }
    }

    fn salary_aggregate(&self, function: AggregateFunction) -> f64 {
        let query = AggregateQuery::over_all(function, NumericField::Salary);
        match self.backend.aggregate(&query) {
            Ok(rows) => rows.first().and_then(|row| row.value).unwrap_or(0.0),
            Err(err) => {
                warn!(
                    "event=store_aggregate module=store status=fallback function={} error={err}",
                    function.as_str()
                );
                0.0
            }
        }
    }

    fn try_summary_by_type(&self) -> Result<Vec<(String, SalarySummary)>, RepoError> {
        let mut groups: BTreeMap<String, SalarySummary> = BTreeMap::new();

        for function in [
            AggregateFunction::Min,
            AggregateFunction::Max,
            AggregateFunction::Average,
            AggregateFunction::Sum,
        ] {
            let query = AggregateQuery::over_all(function, NumericField::Salary)
                .grouped_by(GroupField::Type);
            for row in self.backend.aggregate(&query)? {
                let Some(group) = row.group else {
                    continue;
                };
                let value = row.value.unwrap_or(0.0);
                let entry = groups.entry(group).or_default();
                match function {
                    AggregateFunction::Min => entry.min = value,
                    AggregateFunction::Max => entry.max = value,
                    AggregateFunction::Average => entry.average = value,
                    AggregateFunction::Sum => entry.sum = value,
                }
            }
        }

        for (kind, summary) in groups.iter_mut() {
            summary.count = self.backend.count(&EmployeeFilter::of_type(kind.as_str()))?;
        }
        debug!(
            "event=store_summary_by_type module=store status=ok groups={}",
            groups.len()
        );

        Ok(groups.into_iter().collect())
    }
}
