//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per collection.
//! - Keep SQL, joins and row parsing out of the service layer.
//!
//! # Invariants
//! - Write paths call the model's `validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Unique-constraint violations surface as `RepoError::Conflict`.

pub mod application_repo;
pub mod assignment_repo;
pub mod certificate_repo;
pub mod feedback_repo;
pub mod intern_repo;
pub mod meeting_repo;
pub mod mentor_repo;
pub mod project_repo;
pub mod task_repo;
pub mod user_repo;

use crate::db::DbError;
use crate::model::intern::InternId;
use crate::model::mentor::MentorId;
use crate::model::{InternRef, MentorRef, ValidationError};
use rusqlite::types::Value;
use rusqlite::{ErrorCode, Row};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const MAX_PAGE_LIMIT: u32 = 100;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all collections.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound { entity: &'static str, id: String },
    InvalidData(String),
    Conflict(String),
}

impl RepoError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::InvalidData(_) | Self::Conflict(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
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
        if let rusqlite::Error::SqliteFailure(err, message) = &value {
            let unique = err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY;
            if err.code == ErrorCode::ConstraintViolation && unique {
                return Self::Conflict(
                    message
                        .clone()
                        .unwrap_or_else(|| "unique constraint violated".to_string()),
                );
            }
        }
        Self::Db(DbError::Sqlite(value))
    }
}

/// Which interns (and workflow records) a query may return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// No restriction.
    All,
    /// Interns whose `referred_by_emp_id` matches.
    ReferredBy(String),
    /// Interns actively assigned to the mentor; workflow records owned by it.
    Mentor(MentorId),
    /// One intern and its workflow records.
    Intern(InternId),
    /// Caller has no linked record.
    Nothing,
}

impl Scope {
    /// Whether a workflow record (intern + owning mentor) is visible.
    pub fn permits_record(&self, intern: &InternRef, mentor_id: MentorId) -> bool {
        match self {
            Self::All => true,
            Self::ReferredBy(emp_id) => intern.referred_by_emp_id == *emp_id,
            Self::Mentor(own) => *own == mentor_id,
            Self::Intern(own) => *own == intern.id,
            Self::Nothing => false,
        }
    }
}

/// Normalized page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Clamps raw values: page >= 1, limit in `1..=100`, defaults 1 and 10.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.filter(|page| *page > 0).unwrap_or(1),
            limit: match limit {
                None | Some(0) => DEFAULT_PAGE_LIMIT,
                Some(limit) => limit.min(MAX_PAGE_LIMIT),
            },
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Pagination block returned with every paged list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        Self {
            page: request.page,
            limit: request.limit,
            total,
            pages: total.div_ceil(u64::from(request.limit)),
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Incrementally built `WHERE` clause with positional bind values.
#[derive(Debug, Default)]
pub(crate) struct SqlFilter {
    clauses: Vec<String>,
    values: Vec<Value>,
}

impl SqlFilter {
    pub(crate) fn push(&mut self, clause: impl Into<String>, value: impl Into<Value>) {
        self.clauses.push(clause.into());
        self.values.push(value.into());
    }

    pub(crate) fn push_many(&mut self, clause: impl Into<String>, values: Vec<Value>) {
        self.clauses.push(clause.into());
        self.values.extend(values);
    }

    pub(crate) fn push_raw(&mut self, clause: impl Into<String>) {
        self.clauses.push(clause.into());
    }

    /// Restricts rows by caller scope.
    ///
    /// `intern_col` names the row's intern id column and the interns table
    /// must be joined as `i`. `mentor_col` names the owning mentor column of
    /// workflow rows; without it, mentor scope falls back to active
    /// assignments.
    pub(crate) fn push_scope(&mut self, scope: &Scope, intern_col: &str, mentor_col: Option<&str>) {
        match scope {
            Scope::All => {}
            Scope::Nothing => self.push_raw("0 = 1"),
            Scope::ReferredBy(emp_id) => {
                self.push("i.referred_by_emp_id = ?", Value::Text(emp_id.clone()))
            }
            Scope::Intern(intern_id) => self.push(
                format!("{intern_col} = ?"),
                Value::Text(intern_id.to_string()),
            ),
            Scope::Mentor(mentor_id) => match mentor_col {
                Some(column) => {
                    self.push(format!("{column} = ?"), Value::Text(mentor_id.to_string()))
                }
                None => self.push(
                    format!(
                        "EXISTS (SELECT 1 FROM assignments sa
                         WHERE sa.intern_id = {intern_col}
                           AND sa.mentor_id = ?
                           AND sa.is_active = 1)"
                    ),
                    Value::Text(mentor_id.to_string()),
                ),
            },
        }
    }

    pub(crate) fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub(crate) fn values(&self) -> Vec<Value> {
        self.values.clone()
    }

    /// Bind values followed by `LIMIT ? OFFSET ?` values for `page`.
    pub(crate) fn paged_values(&self, page: PageRequest) -> Vec<Value> {
        let mut values = self.values.clone();
        values.push(Value::Integer(i64::from(page.limit)));
        values.push(Value::Integer(page.offset()));
        values
    }
}

/// Join columns that attach intern and mentor identity to workflow rows.
///
/// Expects the interns table joined as `i` and mentors as `m`.
pub(crate) const PARTY_COLUMNS_SQL: &str = "i.intern_code AS party_intern_code,
    i.name AS party_intern_name,
    i.department AS party_intern_department,
    i.referred_by_emp_id AS party_referred_by_emp_id,
    m.emp_id AS party_mentor_emp_id,
    m.name AS party_mentor_name";

pub(crate) fn parse_parties(row: &Row<'_>) -> RepoResult<(InternRef, MentorRef)> {
    let intern = InternRef {
        id: get_uuid(row, "intern_id")?,
        intern_code: row.get("party_intern_code")?,
        name: row.get("party_intern_name")?,
        department: row.get("party_intern_department")?,
        referred_by_emp_id: row.get("party_referred_by_emp_id")?,
    };
    let mentor = MentorRef {
        id: get_uuid(row, "mentor_id")?,
        emp_id: row.get("party_mentor_emp_id")?,
        name: row.get("party_mentor_name")?,
    };
    Ok((intern, mentor))
}

pub(crate) fn get_uuid(row: &Row<'_>, column: &str) -> RepoResult<Uuid> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{text}` in column {column}")))
}

pub(crate) fn get_optional_uuid(row: &Row<'_>, column: &str) -> RepoResult<Option<Uuid>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => Uuid::parse_str(&text).map(Some).map_err(|_| {
            RepoError::InvalidData(format!("invalid uuid `{text}` in column {column}"))
        }),
        None => Ok(None),
    }
}

/// Reads a text-backed enum column via its `parse` function.
pub(crate) fn get_enum<T>(
    row: &Row<'_>,
    column: &str,
    parse: fn(&str) -> Option<T>,
) -> RepoResult<T> {
    let text: String = row.get(column)?;
    parse(&text)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid value `{text}` in column {column}")))
}

pub(crate) fn get_bool(row: &Row<'_>, column: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean `{other}` in column {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

/// Makes `%`, `_` and `\` literal inside a `LIKE ... ESCAPE '\'` pattern.
pub(crate) fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
