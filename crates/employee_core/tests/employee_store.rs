use employee_core::db::open_db_in_memory;
use employee_core::{
    AggregateQuery, AggregateRow, Employee, EmployeeFilter, EmployeeId, EmployeeListQuery,
    EmployeeStore, NewEmployee, RecordBackend, RepoError, RepoResult, SalarySummary,
    SqliteRecordBackend, StoreError, DEFAULT_EMPLOYEE_TYPE, SALARY_RANGE,
};
use rusqlite::Connection;
use std::cell::Cell;
use std::collections::HashSet;

const TOLERANCE: f64 = 1e-6;

/// SQLite backend whose reads and writes can be switched to fail.
struct FlakyBackend<'conn> {
    inner: SqliteRecordBackend<'conn>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
}

impl<'conn> FlakyBackend<'conn> {
    fn new(conn: &'conn Connection) -> Self {
        Self {
            inner: SqliteRecordBackend::new(conn),
            fail_reads: Cell::new(false),
            fail_writes: Cell::new(false),
        }
    }

    fn read_guard(&self) -> RepoResult<()> {
        if self.fail_reads.get() {
            return Err(RepoError::from(rusqlite::Error::InvalidQuery));
        }
        Ok(())
    }

    fn write_guard(&self) -> RepoResult<()> {
        if self.fail_writes.get() {
            return Err(RepoError::from(rusqlite::Error::InvalidQuery));
        }
        Ok(())
    }
}

impl RecordBackend for FlakyBackend<'_> {
    fn count(&self, filter: &EmployeeFilter) -> RepoResult<u64> {
        self.read_guard()?;
        self.inner.count(filter)
    }

    fn aggregate(&self, query: &AggregateQuery) -> RepoResult<Vec<AggregateRow>> {
        self.read_guard()?;
        self.inner.aggregate(query)
    }

    fn insert(&self, employee: &NewEmployee) -> RepoResult<Employee> {
        self.write_guard()?;
        self.inner.insert(employee)
    }

    fn delete_by_ids(&self, ids: &HashSet<EmployeeId>) -> RepoResult<usize> {
        self.write_guard()?;
        self.inner.delete_by_ids(ids)
    }

    fn delete_matching(&self, filter: &EmployeeFilter) -> RepoResult<Vec<EmployeeId>> {
        self.write_guard()?;
        self.inner.delete_matching(filter)
    }

    fn list(&self, query: &EmployeeListQuery) -> RepoResult<Vec<Employee>> {
        self.read_guard()?;
        self.inner.list(query)
    }
}

fn assert_close(left: f64, right: f64) {
    assert!(
        (left - right).abs() <= TOLERANCE * right.abs().max(1.0),
        "{left} != {right}"
    );
}

#[test]
fn count_matches_number_of_added_records() {
    let conn = open_db_in_memory().unwrap();
    let store = EmployeeStore::new(SqliteRecordBackend::new(&conn));

    for expected in 1..=5 {
        store.add_employee().unwrap();
        assert_eq!(store.count(), expected);
    }
}

#[test]
fn empty_store_aggregates_are_zero() {
    let conn = open_db_in_memory().unwrap();
    let store = EmployeeStore::new(SqliteRecordBackend::new(&conn));

    assert_eq!(store.count(), 0);
    assert_eq!(store.min_salary(), 0.0);
    assert_eq!(store.max_salary(), 0.0);
    assert_eq!(store.average_salary(), 0.0);
    assert_eq!(store.sum_salary(), 0.0);
    assert!(store.list_all().unwrap().is_empty());
}

#[test]
fn aggregates_are_consistent_on_non_empty_store() {
    let conn = open_db_in_memory().unwrap();
    let store = EmployeeStore::new(SqliteRecordBackend::new(&conn));
    for _ in 0..25 {
        store.add_employee().unwrap();
    }

    let summary = store.summary();
    assert_eq!(summary.count, 25);
    assert!(summary.min <= summary.average);
    assert!(summary.average <= summary.max);
    assert_close(summary.sum, summary.average * summary.count as f64);

    let salaries: Vec<f64> = store
        .list_all()
        .unwrap()
        .iter()
        .map(|employee| employee.salary)
        .collect();
    assert_close(summary.sum, salaries.iter().sum());
    assert_eq!(summary.min, salaries[0]);
    assert_eq!(summary.max, salaries[salaries.len() - 1]);
}

#[test]
fn list_all_is_sorted_by_ascending_salary() {
    let conn = open_db_in_memory().unwrap();
    let store = EmployeeStore::new(SqliteRecordBackend::new(&conn));
    for _ in 0..20 {
        store.add_employee().unwrap();
    }

    let employees = store.list_all().unwrap();
    assert_eq!(employees.len(), 20);
    assert!(employees
        .windows(2)
        .all(|pair| pair[0].salary <= pair[1].salary));
}

#[test]
fn add_employee_persists_default_type_and_salary_in_range() {
    let conn = open_db_in_memory().unwrap();
    let store = EmployeeStore::new(SqliteRecordBackend::new(&conn));

    let before = store.count();
    let added = store.add_employee().unwrap();

    assert_eq!(store.count(), before + 1);
    assert_eq!(added.kind, DEFAULT_EMPLOYEE_TYPE);
    assert!(SALARY_RANGE.contains(&added.salary));
    assert_eq!(store.list_all().unwrap(), vec![added]);
}

#[test]
fn delete_employees_removes_only_named_records() {
    let conn = open_db_in_memory().unwrap();
    let store = EmployeeStore::new(SqliteRecordBackend::new(&conn));
    let first = store.add_employee().unwrap();
    let second = store.add_employee().unwrap();

    store
        .delete_employees(&HashSet::from([first.id]))
        .unwrap();

    assert_eq!(store.count(), 1);
    let remaining = store.list_all().unwrap();
    assert!(remaining.iter().all(|employee| employee.id != first.id));
    assert_eq!(remaining[0].id, second.id);
}

#[test]
fn delete_all_empties_the_store() {
    let conn = open_db_in_memory().unwrap();
    let store = EmployeeStore::new(SqliteRecordBackend::new(&conn));
    for _ in 0..4 {
        store.add_employee().unwrap();
    }

    store.delete_all();
    assert_eq!(store.count(), 0);
    assert_eq!(store.summary(), SalarySummary::default());

    store.delete_all();
    assert_eq!(store.count(), 0);
}

#[test]
fn add_three_then_clear_scenario() {
    let conn = open_db_in_memory().unwrap();
    let store = EmployeeStore::new(SqliteRecordBackend::new(&conn));
    assert_eq!(store.count(), 0);

    for _ in 0..3 {
        store.add_employee().unwrap();
    }
    assert_eq!(store.count(), 3);

    let employees = store.list_all().unwrap();
    let middle = employees[1].salary;
    assert!(store.min_salary() <= middle);
    assert!(middle <= store.max_salary());

    store.delete_all();
    assert_eq!(store.count(), 0);
}

#[test]
fn query_failures_fall_back_to_zero() {
    let conn = open_db_in_memory().unwrap();
    let store = EmployeeStore::new(FlakyBackend::new(&conn));
    store.add_employee().unwrap();
    store.add_employee().unwrap();

    store.backend().fail_reads.set(true);
    assert_eq!(store.count(), 0);
    assert_eq!(store.summary(), SalarySummary::default());
    assert!(store.summary_by_type().is_empty());
    assert!(matches!(store.list_all(), Err(StoreError::Persistence(_))));

    store.backend().fail_reads.set(false);
    assert_eq!(store.count(), 2);
}

#[test]
fn delete_all_failure_is_a_silent_no_op() {
    let conn = open_db_in_memory().unwrap();
    let store = EmployeeStore::new(FlakyBackend::new(&conn));
    for _ in 0..3 {
        store.add_employee().unwrap();
    }

    store.backend().fail_writes.set(true);
    store.delete_all();
    assert_eq!(store.count(), 3);
}

#[test]
fn persist_failures_surface_as_errors_and_leave_store_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let store = EmployeeStore::new(FlakyBackend::new(&conn));
    let existing = store.add_employee().unwrap();

    store.backend().fail_writes.set(true);
    let add_err = store.add_employee().unwrap_err();
    assert!(matches!(add_err, StoreError::Persistence(RepoError::Db(_))));

    let delete_err = store
        .delete_employees(&HashSet::from([existing.id]))
        .unwrap_err();
    assert!(delete_err.to_string().starts_with("persistence failed"));

    assert_eq!(store.count(), 1);
}

#[test]
fn summary_by_type_groups_statistics() {
    let conn = open_db_in_memory().unwrap();
    let backend = SqliteRecordBackend::new(&conn);
    backend.insert(&NewEmployee::new("Contractor", 100_000.0)).unwrap();
    backend.insert(&NewEmployee::new("Employee", 60_000.0)).unwrap();
    backend.insert(&NewEmployee::new("Employee", 80_000.0)).unwrap();
    let store = EmployeeStore::new(backend);

    let groups = store.summary_by_type();
    assert_eq!(
        groups,
        vec![
            (
                "Contractor".to_string(),
                SalarySummary {
                    count: 1,
                    min: 100_000.0,
                    max: 100_000.0,
                    average: 100_000.0,
                    sum: 100_000.0,
                }
            ),
            (
                "Employee".to_string(),
                SalarySummary {
                    count: 2,
                    min: 60_000.0,
                    max: 80_000.0,
                    average: 70_000.0,
                    sum: 140_000.0,
                }
            ),
        ]
    );
}
