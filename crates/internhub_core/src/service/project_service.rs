//! Project submission, review and report attachment.

use super::access::{self, Caller};
use super::{now_millis, ServiceError, ServiceResult};
use crate::model::project::{report_url, NewProject, Project, ProjectId, ProjectReview};
use crate::model::user::Role;
use crate::model::{ValidationError, WithParties};
use crate::repo::assignment_repo::{AssignmentRepository, SqliteAssignmentRepository};
use crate::repo::intern_repo::{InternRepository, SqliteInternRepository};
use crate::repo::project_repo::{ProjectListQuery, ProjectRepository, SqliteProjectRepository};
use crate::repo::{Page, PageRequest, Scope};
use log::{info, warn};
use rusqlite::Connection;

pub struct ProjectService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> ProjectService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn load(&self, id: ProjectId) -> ServiceResult<WithParties<Project>> {
        SqliteProjectRepository::new(self.conn)
            .get_project(id)?
            .ok_or_else(|| ServiceError::not_found("Project"))
    }

    /// Submits a project; the intern's active mentor becomes its reviewer.
    pub fn submit(&self, caller: &Caller, input: NewProject) -> ServiceResult<WithParties<Project>> {
        caller.require_any(&[Role::Admin, Role::Intern])?;
        let intern = match caller.role {
            Role::Intern => {
                let own = access::caller_intern(self.conn, caller)?
                    .ok_or_else(|| ServiceError::not_found("Intern profile"))?;
                if input.intern_id.is_some_and(|requested| requested != own.id) {
                    return Err(ServiceError::access_denied());
                }
                own
            }
            _ => {
                let intern_id = input.intern_id.ok_or_else(|| {
                    ServiceError::Validation(ValidationError::new("internId", "is required"))
                })?;
                SqliteInternRepository::new(self.conn)
                    .get_intern(intern_id)?
                    .ok_or_else(|| ServiceError::not_found("Intern"))?
            }
        };

        let assignment = SqliteAssignmentRepository::new(self.conn)
            .active_for_intern(intern.id)?
            .ok_or_else(|| {
                ServiceError::NotFound("No active mentor assignment for this intern".to_string())
            })?;
        let project = Project::submitted(intern.id, assignment.mentor_id, input);
        SqliteProjectRepository::new(self.conn).create_project(&project)?;
        info!("event=project_submit module=service status=ok");
        self.load(project.id)
    }

    pub fn list(
        &self,
        caller: &Caller,
        query: &ProjectListQuery,
        page: PageRequest,
    ) -> ServiceResult<Page<WithParties<Project>>> {
        let scope = access::resolve_scope(self.conn, caller)?;
        Ok(SqliteProjectRepository::new(self.conn).list_projects(query, &scope, page)?)
    }

    pub fn get(&self, caller: &Caller, id: ProjectId) -> ServiceResult<WithParties<Project>> {
        let project = self.load(id)?;
        let scope = access::resolve_scope(self.conn, caller)?;
        access::ensure_record_visible(&scope, &project.intern, project.record.mentor_id)?;
        Ok(project)
    }

    /// Records review outcome; decisions stamp `reviewed_at`.
    pub fn review(
        &self,
        caller: &Caller,
        id: ProjectId,
        review: ProjectReview,
    ) -> ServiceResult<WithParties<Project>> {
        caller.require_any(&[Role::Admin, Role::Mentor])?;
        let review = review.normalized();
        review.validate()?;
        let current = self.load(id)?;
        access::ensure_owning_mentor(self.conn, caller, current.record.mentor_id)?;

        let mut project = current.record;
        project.status = review.status;
        project.feedback = review.feedback;
        project.grade = review.grade;
        if review.status.is_decided() {
            project.reviewed_at = Some(now_millis());
        }
        SqliteProjectRepository::new(self.conn).update_project(&project)?;
        info!(
            "event=project_review module=service status=ok decision={}",
            project.status
        );
        self.load(id)
    }

    /// Points the project at its report and persists the bytes through `store`.
    ///
    /// The row update and the write succeed or fail together: a failed write
    /// rolls the update back, a failed commit discards the written file.
    pub fn attach_report(
        &self,
        caller: &Caller,
        id: ProjectId,
        store: &impl ReportStore,
    ) -> ServiceResult<WithParties<Project>> {
        caller.require_any(&[Role::Admin, Role::Intern])?;
        let current = self.load(id)?;
        if caller.role == Role::Intern {
            let scope = access::resolve_scope(self.conn, caller)?;
            if !matches!(scope, Scope::Intern(own) if own == current.record.intern_id) {
                return Err(ServiceError::access_denied());
            }
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut project = current.record;
        project.file_url = Some(report_url(project.id));
        SqliteProjectRepository::new(&tx).update_project(&project)?;
        store.store(id).map_err(|err| {
            ServiceError::Internal(format!("failed to store project report: {err}"))
        })?;
        if let Err(err) = tx.commit() {
            if let Err(cleanup) = store.discard(id) {
                warn!(
                    "event=project_report_upload module=service status=error stage=discard error={}",
                    cleanup
                );
            }
            return Err(err.into());
        }
        info!("event=project_report_upload module=service status=ok");
        self.load(id)
    }
}

/// Backing storage for uploaded project reports.
pub trait ReportStore {
    /// Writes the pending report for project `id`.
    fn store(&self, id: ProjectId) -> std::io::Result<()>;
    /// Removes what `store` wrote for `id`.
    fn discard(&self, id: ProjectId) -> std::io::Result<()>;
}
