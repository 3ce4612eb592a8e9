//! Intern repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `intern_code` uniqueness is enforced by storage; a clash is `Conflict`.
//! - Documents are stored as one JSON object column.

use super::{
    count_to_u64, escape_like, get_enum, get_optional_uuid, get_uuid, Page, PageRequest,
    Pagination, RepoError, RepoResult, Scope, SqlFilter,
};
use crate::model::application::ApplicationStatus;
use crate::model::intern::{Intern, InternId, InternStatus};
use crate::model::mentor::MentorId;
use crate::model::MentorRef;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::Serialize;
use std::collections::BTreeMap;

const INTERN_COLUMNS_SQL: &str = "i.id,
    i.intern_code,
    i.name,
    i.email,
    i.phone,
    i.institute,
    i.course,
    i.semester,
    i.roll_number,
    i.department,
    i.start_date,
    i.end_date,
    i.address,
    i.documents,
    i.status,
    i.referred_by,
    i.referred_by_emp_id,
    i.created_at,
    i.updated_at";

const SUMMARY_FROM_SQL: &str = "FROM interns i
LEFT JOIN assignments a ON a.intern_id = i.id AND a.is_active = 1
LEFT JOIN mentors am ON am.id = a.mentor_id";

/// Filters for intern listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InternListQuery {
    pub status: Option<InternStatus>,
    pub department: Option<String>,
    pub mentor_id: Option<MentorId>,
    /// Case-insensitive match on name, e-mail, intern code or institute.
    pub search: Option<String>,
}

/// Listing row: intern plus its active mentor and latest application status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternSummary {
    #[serde(flatten)]
    pub intern: Intern,
    pub mentor: Option<MentorRef>,
    pub application_status: Option<ApplicationStatus>,
}

pub trait InternRepository {
    fn create_intern(&self, intern: &Intern) -> RepoResult<InternId>;
    fn get_intern(&self, id: InternId) -> RepoResult<Option<Intern>>;
    fn find_by_code(&self, intern_code: &str) -> RepoResult<Option<Intern>>;
    fn code_exists(&self, intern_code: &str) -> RepoResult<bool>;
    /// Persists every mutable field, status included.
    fn update_intern(&self, intern: &Intern) -> RepoResult<()>;
    fn set_status(&self, id: InternId, status: InternStatus) -> RepoResult<()>;
    fn list_interns(
        &self,
        query: &InternListQuery,
        scope: &Scope,
        page: PageRequest,
    ) -> RepoResult<Page<InternSummary>>;
}

pub struct SqliteInternRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteInternRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_one(&self, column: &str, value: String) -> RepoResult<Option<Intern>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {INTERN_COLUMNS_SQL} FROM interns i WHERE i.{column} = ?1;"
        ))?;
        let row = stmt
            .query_row([value], |row| Ok(parse_intern_row(row)))
            .optional()?;
        row.transpose()
    }
}

impl InternRepository for SqliteInternRepository<'_> {
    fn create_intern(&self, intern: &Intern) -> RepoResult<InternId> {
        intern.validate()?;

        self.conn.execute(
            "INSERT INTO interns (
                id,
                intern_code,
                name,
                email,
                phone,
                institute,
                course,
                semester,
                roll_number,
                department,
                start_date,
                end_date,
                address,
                documents,
                status,
                referred_by,
                referred_by_emp_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17);",
            params![
                intern.id.to_string(),
                intern.intern_code.as_str(),
                intern.name.as_str(),
                intern.email.as_str(),
                intern.phone.as_str(),
                intern.institute.as_str(),
                intern.course.as_str(),
                intern.semester.as_str(),
                intern.roll_number.as_str(),
                intern.department.as_str(),
                intern.start_date,
                intern.end_date,
                intern.address.as_str(),
                documents_to_db(&intern.documents)?,
                intern.status.as_str(),
                intern.referred_by.as_str(),
                intern.referred_by_emp_id.as_str(),
            ],
        )?;

        Ok(intern.id)
    }

    fn get_intern(&self, id: InternId) -> RepoResult<Option<Intern>> {
        self.query_one("id", id.to_string())
    }

    fn find_by_code(&self, intern_code: &str) -> RepoResult<Option<Intern>> {
        self.query_one("intern_code", intern_code.to_string())
    }

    fn code_exists(&self, intern_code: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM interns WHERE intern_code = ?1);",
            [intern_code],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn update_intern(&self, intern: &Intern) -> RepoResult<()> {
        intern.validate()?;

        let changed = self.conn.execute(
            "UPDATE interns
             SET
                name = ?1,
                email = ?2,
                phone = ?3,
                institute = ?4,
                course = ?5,
                semester = ?6,
                roll_number = ?7,
                department = ?8,
                start_date = ?9,
                end_date = ?10,
                address = ?11,
                documents = ?12,
                status = ?13,
                referred_by = ?14,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?15;",
            params![
                intern.name.as_str(),
                intern.email.as_str(),
                intern.phone.as_str(),
                intern.institute.as_str(),
                intern.course.as_str(),
                intern.semester.as_str(),
                intern.roll_number.as_str(),
                intern.department.as_str(),
                intern.start_date,
                intern.end_date,
                intern.address.as_str(),
                documents_to_db(&intern.documents)?,
                intern.status.as_str(),
                intern.referred_by.as_str(),
                intern.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("Intern", intern.id));
        }
        Ok(())
    }

    fn set_status(&self, id: InternId, status: InternStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE interns
             SET
                status = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
            params![status.as_str(), id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("Intern", id));
        }
        Ok(())
    }

    fn list_interns(
        &self,
        query: &InternListQuery,
        scope: &Scope,
        page: PageRequest,
    ) -> RepoResult<Page<InternSummary>> {
        let mut filter = SqlFilter::default();
        filter.push_scope(scope, "i.id", None);
        if let Some(status) = query.status {
            filter.push("i.status = ?", Value::Text(status.as_str().to_string()));
        }
        if let Some(department) = &query.department {
            filter.push("i.department = ?", Value::Text(department.clone()));
        }
        if let Some(mentor_id) = query.mentor_id {
            filter.push("a.mentor_id = ?", Value::Text(mentor_id.to_string()));
        }
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
            filter.push_many(
                "(LOWER(i.name) LIKE ? ESCAPE '\\' OR LOWER(i.email) LIKE ? ESCAPE '\\'
                  OR LOWER(i.intern_code) LIKE ? ESCAPE '\\'
                  OR LOWER(i.institute) LIKE ? ESCAPE '\\')",
                vec![Value::Text(pattern); 4],
            );
        }
        let where_sql = filter.where_sql();

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) {SUMMARY_FROM_SQL}{where_sql};"),
            params_from_iter(filter.values()),
            |row| row.get(0),
        )?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT
                {INTERN_COLUMNS_SQL},
                am.id AS mentor_id,
                am.emp_id AS mentor_emp_id,
                am.name AS mentor_name,
                (SELECT ap.status FROM applications ap
                 WHERE ap.intern_id = i.id
                 ORDER BY ap.created_at DESC, ap.rowid DESC
                 LIMIT 1) AS application_status
             {SUMMARY_FROM_SQL}{where_sql}
             ORDER BY i.created_at DESC, i.rowid DESC
             LIMIT ? OFFSET ?;"
        ))?;
        let mut rows = stmt.query(params_from_iter(filter.paged_values(page)))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_summary_row(row)?);
        }

        Ok(Page {
            items,
            pagination: Pagination::new(page, count_to_u64(total)),
        })
    }
}

pub(crate) fn parse_intern_row(row: &Row<'_>) -> RepoResult<Intern> {
    let documents_text: String = row.get("documents")?;
    let documents: BTreeMap<String, String> = serde_json::from_str(&documents_text)
        .map_err(|err| RepoError::InvalidData(format!("invalid interns.documents json: {err}")))?;

    Ok(Intern {
        id: get_uuid(row, "id")?,
        intern_code: row.get("intern_code")?,
        name: row.get("name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        institute: row.get("institute")?,
        course: row.get("course")?,
        semester: row.get("semester")?,
        roll_number: row.get("roll_number")?,
        department: row.get("department")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        address: row.get("address")?,
        documents,
        status: get_enum(row, "status", InternStatus::parse)?,
        referred_by: row.get("referred_by")?,
        referred_by_emp_id: row.get("referred_by_emp_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_summary_row(row: &Row<'_>) -> RepoResult<InternSummary> {
    let mentor = match get_optional_uuid(row, "mentor_id")? {
        Some(id) => Some(MentorRef {
            id,
            emp_id: row.get("mentor_emp_id")?,
            name: row.get("mentor_name")?,
        }),
        None => None,
    };
    let application_status = match row.get::<_, Option<String>>("application_status")? {
        Some(text) => Some(ApplicationStatus::parse(&text).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid application status `{text}`"))
        })?),
        None => None,
    };

    Ok(InternSummary {
        intern: parse_intern_row(row)?,
        mentor,
        application_status,
    })
}

fn documents_to_db(documents: &BTreeMap<String, String>) -> RepoResult<String> {
    serde_json::to_string(documents)
        .map_err(|err| RepoError::InvalidData(format!("unserializable documents: {err}")))
}
