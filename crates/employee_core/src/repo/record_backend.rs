//! Record backend contract and SQLite implementation.
//!
//! # Responsibility
//! - Define the narrow capability set the employee store depends on:
//!   count, aggregate, insert, delete-by-ids, batch delete, sorted listing.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `validate()` before SQL mutations.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Ungrouped aggregate queries return exactly one row.

use crate::db::DbError;
use crate::model::employee::{Employee, EmployeeId, EmployeeValidationError, NewEmployee};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const EMPLOYEE_SELECT_SQL: &str = "SELECT uuid, type, salary FROM employees";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for employee persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(EmployeeValidationError),
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted employee data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<EmployeeValidationError> for RepoError {
    fn from(value: EmployeeValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Predicate over stored records. The default matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeFilter {
    pub kind: Option<String>,
}

impl EmployeeFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn of_type(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
        }
    }
}

/// Scalar aggregate functions supported over numeric fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Min,
    Max,
    Average,
    Sum,
}

impl AggregateFunction {
    /// Stable name used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::Average => "average",
            Self::Sum => "sum",
        }
    }

    fn sql(self) -> &'static str {
        match self {
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::Average => "AVG",
            Self::Sum => "SUM",
        }
    }
}

/// Numeric fields that can be aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    Salary,
}

impl NumericField {
    fn column(self) -> &'static str {
        match self {
            Self::Salary => "salary",
        }
    }
}

/// Fields aggregate results can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    Type,
}

impl GroupField {
    fn column(self) -> &'static str {
        match self {
            Self::Type => "type",
        }
    }
}

/// One aggregate request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateQuery {
    pub function: AggregateFunction,
    pub field: NumericField,
    pub group_by: Option<GroupField>,
    pub filter: EmployeeFilter,
}

impl AggregateQuery {
    /// Ungrouped aggregate over every record.
    pub fn over_all(function: AggregateFunction, field: NumericField) -> Self {
        Self {
            function,
            field,
            group_by: None,
            filter: EmployeeFilter::all(),
        }
    }

    pub fn grouped_by(mut self, group: GroupField) -> Self {
        self.group_by = Some(group);
        self
    }
}

/// One aggregate result row.
///
/// `group` is `None` for ungrouped queries. `value` is `None` when the
/// aggregated set is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub group: Option<String>,
    pub value: Option<f64>,
}

/// Fields records can be listed by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    Salary,
    Type,
}

impl SortField {
    fn column(self) -> &'static str {
        match self {
            Self::Salary => "salary",
            Self::Type => "type",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    fn sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Query options for listing records. Defaults to ascending salary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeListQuery {
    pub filter: EmployeeFilter,
    pub sort_by: SortField,
    pub direction: SortDirection,
    pub limit: Option<u32>,
}

/// Persistence capabilities the employee store is built on.
pub trait RecordBackend {
    fn count(&self, filter: &EmployeeFilter) -> RepoResult<u64>;
    fn aggregate(&self, query: &AggregateQuery) -> RepoResult<Vec<AggregateRow>>;
    fn insert(&self, employee: &NewEmployee) -> RepoResult<Employee>;
    /// Removes the named records in one transaction. Unknown ids are ignored.
    fn delete_by_ids(&self, ids: &HashSet<EmployeeId>) -> RepoResult<usize>;
    /// Batch delete; returns the identifiers that were removed.
    fn delete_matching(&self, filter: &EmployeeFilter) -> RepoResult<Vec<EmployeeId>>;
    fn list(&self, query: &EmployeeListQuery) -> RepoResult<Vec<Employee>>;
}

/// SQLite-backed record backend over a borrowed connection.
pub struct SqliteRecordBackend<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordBackend<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RecordBackend for SqliteRecordBackend<'_> {
    fn count(&self, filter: &EmployeeFilter) -> RepoResult<u64> {
        let mut sql = "SELECT COUNT(*) FROM employees WHERE 1 = 1".to_string();
        let mut bind_values = Vec::new();
        push_filter(filter, &mut sql, &mut bind_values);

        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }

    fn aggregate(&self, query: &AggregateQuery) -> RepoResult<Vec<AggregateRow>> {
        let expression = format!("{}({})", query.function.sql(), query.field.column());
        let mut bind_values = Vec::new();

        let mut sql = match query.group_by {
            Some(group) => format!("SELECT {}, {expression} FROM employees", group.column()),
            None => format!("SELECT NULL, {expression} FROM employees"),
        };
        sql.push_str(" WHERE 1 = 1");
        push_filter(&query.filter, &mut sql, &mut bind_values);
        if let Some(group) = query.group_by {
            let column = group.column();
            sql.push_str(&format!(" GROUP BY {column} ORDER BY {column} ASC"));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            results.push(AggregateRow {
                group: row.get(0)?,
                value: row.get(1)?,
            });
        }

        Ok(results)
    }

    fn insert(&self, employee: &NewEmployee) -> RepoResult<Employee> {
        employee.validate()?;

        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO employees (uuid, type, salary) VALUES (?1, ?2, ?3);",
            params![id.to_string(), employee.kind.as_str(), employee.salary],
        )?;

        Ok(employee.clone().into_employee(id))
    }

    fn delete_by_ids(&self, ids: &HashSet<EmployeeId>) -> RepoResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut removed = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM employees WHERE uuid = ?1;")?;
            for id in ids {
                removed += stmt.execute([id.to_string()])?;
            }
        }
        tx.commit()?;

        Ok(removed)
    }

    fn delete_matching(&self, filter: &EmployeeFilter) -> RepoResult<Vec<EmployeeId>> {
        let mut sql = "DELETE FROM employees WHERE 1 = 1".to_string();
        let mut bind_values = Vec::new();
        push_filter(filter, &mut sql, &mut bind_values);
        sql.push_str(" RETURNING uuid");

        let tx = self.conn.unchecked_transaction()?;
        let removed = {
            let mut stmt = tx.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(bind_values))?;
            let mut removed = Vec::new();
            while let Some(row) = rows.next()? {
                removed.push(row.get::<_, String>(0)?);
            }
            removed
        };
        let ids = removed
            .iter()
            .map(|text| parse_employee_id(text))
            .collect::<RepoResult<Vec<_>>>()?;
        tx.commit()?;

        Ok(ids)
    }

    fn list(&self, query: &EmployeeListQuery) -> RepoResult<Vec<Employee>> {
        let mut sql = format!("{EMPLOYEE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values = Vec::new();
        push_filter(&query.filter, &mut sql, &mut bind_values);

        sql.push_str(&format!(
            " ORDER BY {} {}, uuid ASC",
            query.sort_by.column(),
            query.direction.sql()
        ));
        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut employees = Vec::new();
        while let Some(row) = rows.next()? {
            employees.push(parse_employee_row(row)?);
        }

        Ok(employees)
    }
}

fn push_filter(filter: &EmployeeFilter, sql: &mut String, bind_values: &mut Vec<Value>) {
    if let Some(kind) = &filter.kind {
        sql.push_str(" AND type = ?");
        bind_values.push(Value::Text(kind.clone()));
    }
}

fn parse_employee_id(text: &str) -> RepoResult<EmployeeId> {
    Uuid::parse_str(text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{text}` in employees.uuid"))
    })
}

fn parse_employee_row(row: &Row<'_>) -> RepoResult<Employee> {
    let uuid_text: String = row.get("uuid")?;
    let employee = Employee {
        id: parse_employee_id(&uuid_text)?,
        kind: row.get("type")?,
        salary: row.get("salary")?,
    };
    employee
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("row `{uuid_text}`: {err}")))?;
    Ok(employee)
}
