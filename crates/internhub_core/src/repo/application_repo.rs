//! Application repository contracts and SQLite implementation.

use super::{get_enum, get_optional_uuid, get_uuid, RepoError, RepoResult, Scope, SqlFilter};
use crate::model::application::{Application, ApplicationId, ApplicationStatus};
use crate::model::intern::InternId;
use crate::model::user::UserId;
use crate::model::InternRef;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde::Serialize;

const APPLICATION_SELECT_SQL: &str = "SELECT
    ap.id,
    ap.intern_id,
    ap.status,
    ap.reviewed_by,
    ap.review_notes,
    ap.created_at,
    ap.updated_at,
    i.intern_code,
    i.name AS intern_name,
    i.department AS intern_department,
    i.referred_by_emp_id,
    u.name AS reviewer_name
FROM applications ap
JOIN interns i ON i.id = ap.intern_id
LEFT JOIN users u ON u.id = ap.reviewed_by";

/// Application together with its intern and reviewer name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    #[serde(flatten)]
    pub application: Application,
    pub intern: InternRef,
    pub reviewer_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationListQuery {
    pub status: Option<ApplicationStatus>,
    pub department: Option<String>,
}

pub trait ApplicationRepository {
    fn create_application(&self, application: &Application) -> RepoResult<ApplicationId>;
    fn get_application(&self, id: ApplicationId) -> RepoResult<Option<ApplicationRecord>>;
    fn exists_for_intern(&self, intern_id: InternId) -> RepoResult<bool>;
    fn latest_for_intern(&self, intern_id: InternId) -> RepoResult<Option<ApplicationRecord>>;
    fn record_review(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
        reviewer: UserId,
        notes: Option<&str>,
    ) -> RepoResult<()>;
    /// Newest first.
    fn list_applications(
        &self,
        query: &ApplicationListQuery,
        scope: &Scope,
    ) -> RepoResult<Vec<ApplicationRecord>>;
    /// `SUBMITTED` applications, oldest first.
    fn list_pending(&self) -> RepoResult<Vec<ApplicationRecord>>;
    fn list_for_intern(&self, intern_id: InternId) -> RepoResult<Vec<ApplicationRecord>>;
}

pub struct SqliteApplicationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteApplicationRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query(&self, filter: &SqlFilter, order_sql: &str) -> RepoResult<Vec<ApplicationRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{APPLICATION_SELECT_SQL}{} ORDER BY {order_sql};",
            filter.where_sql()
        ))?;
        let mut rows = stmt.query(params_from_iter(filter.values()))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_application_row(row)?);
        }
        Ok(records)
    }
}

impl ApplicationRepository for SqliteApplicationRepository<'_> {
    fn create_application(&self, application: &Application) -> RepoResult<ApplicationId> {
        self.conn.execute(
            "INSERT INTO applications (id, intern_id, status, reviewed_by, review_notes)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                application.id.to_string(),
                application.intern_id.to_string(),
                application.status.as_str(),
                application.reviewed_by.map(|id| id.to_string()),
                application.review_notes.as_deref(),
            ],
        )?;
        Ok(application.id)
    }

    fn get_application(&self, id: ApplicationId) -> RepoResult<Option<ApplicationRecord>> {
        let mut filter = SqlFilter::default();
        filter.push("ap.id = ?", Value::Text(id.to_string()));
        Ok(self.query(&filter, "ap.created_at DESC")?.into_iter().next())
    }

    fn exists_for_intern(&self, intern_id: InternId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM applications WHERE intern_id = ?1);",
            [intern_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn latest_for_intern(&self, intern_id: InternId) -> RepoResult<Option<ApplicationRecord>> {
        Ok(self.list_for_intern(intern_id)?.into_iter().next())
    }

    fn record_review(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
        reviewer: UserId,
        notes: Option<&str>,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE applications
             SET
                status = ?1,
                reviewed_by = ?2,
                review_notes = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?4;",
            params![status.as_str(), reviewer.to_string(), notes, id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("Application", id));
        }
        Ok(())
    }

    fn list_applications(
        &self,
        query: &ApplicationListQuery,
        scope: &Scope,
    ) -> RepoResult<Vec<ApplicationRecord>> {
        let mut filter = SqlFilter::default();
        filter.push_scope(scope, "ap.intern_id", None);
        if let Some(status) = query.status {
            filter.push("ap.status = ?", Value::Text(status.as_str().to_string()));
        }
        if let Some(department) = &query.department {
            filter.push("i.department = ?", Value::Text(department.clone()));
        }
        self.query(&filter, "ap.created_at DESC, ap.rowid DESC")
    }

    fn list_pending(&self) -> RepoResult<Vec<ApplicationRecord>> {
        let mut filter = SqlFilter::default();
        filter.push(
            "ap.status = ?",
            Value::Text(ApplicationStatus::Submitted.as_str().to_string()),
        );
        self.query(&filter, "ap.created_at ASC, ap.rowid ASC")
    }

    fn list_for_intern(&self, intern_id: InternId) -> RepoResult<Vec<ApplicationRecord>> {
        let mut filter = SqlFilter::default();
        filter.push("ap.intern_id = ?", Value::Text(intern_id.to_string()));
        self.query(&filter, "ap.created_at DESC, ap.rowid DESC")
    }
}

fn parse_application_row(row: &Row<'_>) -> RepoResult<ApplicationRecord> {
    let application = Application {
        id: get_uuid(row, "id")?,
        intern_id: get_uuid(row, "intern_id")?,
        status: get_enum(row, "status", ApplicationStatus::parse)?,
        reviewed_by: get_optional_uuid(row, "reviewed_by")?,
        review_notes: row.get("review_notes")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    let intern = InternRef {
        id: application.intern_id,
        intern_code: row.get("intern_code")?,
        name: row.get("intern_name")?,
        department: row.get("intern_department")?,
        referred_by_emp_id: row.get("referred_by_emp_id")?,
    };
    Ok(ApplicationRecord {
        application,
        intern,
        reviewer_name: row.get("reviewer_name")?,
    })
}
