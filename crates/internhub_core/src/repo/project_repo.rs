//! Project repository contracts and SQLite implementation.

use super::{
    count_to_u64, get_enum, get_uuid, parse_parties, Page, PageRequest, Pagination, RepoError,
    RepoResult, Scope, SqlFilter, PARTY_COLUMNS_SQL,
};
use crate::model::intern::InternId;
use crate::model::mentor::MentorId;
use crate::model::project::{Project, ProjectId, ProjectStatus};
use crate::model::WithParties;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const PROJECT_COLUMNS_SQL: &str = "p.id,
    p.intern_id,
    p.mentor_id,
    p.title,
    p.description,
    p.file_url,
    p.status,
    p.feedback,
    p.grade,
    p.submitted_at,
    p.reviewed_at";

const PROJECT_FROM_SQL: &str = "FROM projects p
JOIN interns i ON i.id = p.intern_id
JOIN mentors m ON m.id = p.mentor_id";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectListQuery {
    pub intern_id: Option<InternId>,
    pub mentor_id: Option<MentorId>,
    pub status: Option<ProjectStatus>,
}

pub trait ProjectRepository {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<WithParties<Project>>>;
    /// Persists content, review outcome and report location.
    fn update_project(&self, project: &Project) -> RepoResult<()>;
    fn list_projects(
        &self,
        query: &ProjectListQuery,
        scope: &Scope,
        page: PageRequest,
    ) -> RepoResult<Page<WithParties<Project>>>;
    fn projects_of_intern(
        &self,
        intern_id: InternId,
        mentor_id: Option<MentorId>,
    ) -> RepoResult<Vec<Project>>;
    /// Most recently submitted `APPROVED` project of an intern.
    fn latest_approved(&self, intern_id: InternId) -> RepoResult<Option<WithParties<Project>>>;
}

pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn select(
        &self,
        filter: &SqlFilter,
        tail: &str,
        values: Vec<Value>,
    ) -> RepoResult<Vec<WithParties<Project>>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS_SQL}, {PARTY_COLUMNS_SQL}
             {PROJECT_FROM_SQL}{}
             ORDER BY p.submitted_at DESC, p.rowid DESC{tail};",
            filter.where_sql()
        ))?;
        let mut rows = stmt.query(params_from_iter(values))?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            let (intern, mentor) = parse_parties(row)?;
            projects.push(WithParties {
                record: parse_project_row(row)?,
                intern,
                mentor,
            });
        }
        Ok(projects)
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId> {
        project.validate()?;

        self.conn.execute(
            "INSERT INTO projects (
                id,
                intern_id,
                mentor_id,
                title,
                description,
                file_url,
                status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                project.id.to_string(),
                project.intern_id.to_string(),
                project.mentor_id.to_string(),
                project.title.as_str(),
                project.description.as_deref(),
                project.file_url.as_deref(),
                project.status.as_str(),
            ],
        )?;
        Ok(project.id)
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<WithParties<Project>>> {
        let mut filter = SqlFilter::default();
        filter.push("p.id = ?", Value::Text(id.to_string()));
        Ok(self.select(&filter, "", filter.values())?.into_iter().next())
    }

    fn update_project(&self, project: &Project) -> RepoResult<()> {
        project.validate()?;

        let changed = self.conn.execute(
            "UPDATE projects
             SET
                title = ?1,
                description = ?2,
                file_url = ?3,
                status = ?4,
                feedback = ?5,
                grade = ?6,
                reviewed_at = ?7
             WHERE id = ?8;",
            params![
                project.title.as_str(),
                project.description.as_deref(),
                project.file_url.as_deref(),
                project.status.as_str(),
                project.feedback.as_deref(),
                project.grade.as_deref(),
                project.reviewed_at,
                project.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("Project", project.id));
        }
        Ok(())
    }

    fn list_projects(
        &self,
        query: &ProjectListQuery,
        scope: &Scope,
        page: PageRequest,
    ) -> RepoResult<Page<WithParties<Project>>> {
        let mut filter = SqlFilter::default();
        filter.push_scope(scope, "p.intern_id", Some("p.mentor_id"));
        if let Some(intern_id) = query.intern_id {
            filter.push("p.intern_id = ?", Value::Text(intern_id.to_string()));
        }
        if let Some(mentor_id) = query.mentor_id {
            filter.push("p.mentor_id = ?", Value::Text(mentor_id.to_string()));
        }
        if let Some(status) = query.status {
            filter.push("p.status = ?", Value::Text(status.as_str().to_string()));
        }

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) {PROJECT_FROM_SQL}{};", filter.where_sql()),
            params_from_iter(filter.values()),
            |row| row.get(0),
        )?;
        let items = self.select(&filter, " LIMIT ? OFFSET ?", filter.paged_values(page))?;

        Ok(Page {
            items,
            pagination: Pagination::new(page, count_to_u64(total)),
        })
    }

    fn projects_of_intern(
        &self,
        intern_id: InternId,
        mentor_id: Option<MentorId>,
    ) -> RepoResult<Vec<Project>> {
        let mut filter = SqlFilter::default();
        filter.push("p.intern_id = ?", Value::Text(intern_id.to_string()));
        if let Some(mentor_id) = mentor_id {
            filter.push("p.mentor_id = ?", Value::Text(mentor_id.to_string()));
        }
        let projects = self.select(&filter, "", filter.values())?;
        Ok(projects.into_iter().map(|project| project.record).collect())
    }

    fn latest_approved(&self, intern_id: InternId) -> RepoResult<Option<WithParties<Project>>> {
        let mut filter = SqlFilter::default();
        filter.push("p.intern_id = ?", Value::Text(intern_id.to_string()));
        filter.push(
            "p.status = ?",
            Value::Text(ProjectStatus::Approved.as_str().to_string()),
        );
        Ok(self
            .select(&filter, " LIMIT 1", filter.values())?
            .into_iter()
            .next())
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    Ok(Project {
        id: get_uuid(row, "id")?,
        intern_id: get_uuid(row, "intern_id")?,
        mentor_id: get_uuid(row, "mentor_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        file_url: row.get("file_url")?,
        status: get_enum(row, "status", ProjectStatus::parse)?,
        feedback: row.get("feedback")?,
        grade: row.get("grade")?,
        submitted_at: row.get("submitted_at")?,
        reviewed_at: row.get("reviewed_at")?,
    })
}
