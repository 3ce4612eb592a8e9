//! Intern registration, listing, detail and lifecycle use-cases.
//!
//! # Invariants
//! - Registration writes the intern and its `SUBMITTED` application together.
//! - Soft delete and completion release any active mentor assignment.

use super::access::{self, Caller};
use super::mentor_service::release_assignment;
use super::{now_millis, ServiceError, ServiceResult};
use crate::model::application::Application;
use crate::model::assignment::Assignment;
use crate::model::feedback::Feedback;
use crate::model::intern::{
    intern_code_from_millis, Intern, InternId, InternPatch, InternStatus, NewIntern,
};
use crate::model::meeting::Meeting;
use crate::model::mentor::Mentor;
use crate::model::project::Project;
use crate::model::task::Task;
use crate::model::user::Role;
use crate::repo::application_repo::{
    ApplicationRecord, ApplicationRepository, SqliteApplicationRepository,
};
use crate::repo::assignment_repo::{AssignmentRepository, SqliteAssignmentRepository};
use crate::repo::feedback_repo::{FeedbackRepository, SqliteFeedbackRepository};
use crate::repo::intern_repo::{
    InternListQuery, InternRepository, InternSummary, SqliteInternRepository,
};
use crate::repo::meeting_repo::{MeetingRepository, SqliteMeetingRepository};
use crate::repo::mentor_repo::{MentorRepository, SqliteMentorRepository};
use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use crate::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use crate::repo::{Page, PageRequest, Scope};
use log::info;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeMap;

const MAX_CODE_ATTEMPTS: i64 = 1_000;

/// Registration result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InternCreated {
    pub intern: Intern,
    pub application: Application,
}

/// Active assignment together with the mentor record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveMentor {
    pub assignment: Assignment,
    pub mentor: Mentor,
}

/// Full intern view with related workflow records, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InternDetail {
    #[serde(flatten)]
    pub intern: Intern,
    pub assignment: Option<ActiveMentor>,
    pub applications: Vec<ApplicationRecord>,
    pub feedback: Vec<Feedback>,
    pub tasks: Vec<Task>,
    pub projects: Vec<Project>,
    pub meetings: Vec<Meeting>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternDocuments {
    pub intern_code: String,
    pub name: String,
    pub documents: BTreeMap<String, String>,
}

pub struct InternService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> InternService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Loads an intern the caller may see; `404` before `403`.
    fn visible_intern(&self, caller: &Caller, id: InternId) -> ServiceResult<(Intern, Scope)> {
        let intern = SqliteInternRepository::new(self.conn)
            .get_intern(id)?
            .ok_or_else(|| ServiceError::not_found("Intern"))?;
        let scope = access::resolve_scope(self.conn, caller)?;
        access::ensure_intern_visible(self.conn, &scope, &intern)?;
        Ok((intern, scope))
    }

    pub fn create(&self, caller: &Caller, input: NewIntern) -> ServiceResult<InternCreated> {
        caller.require_any(&[Role::Admin, Role::Employee])?;
        let mut input = input.normalized();
        if caller.role == Role::Employee {
            input.referred_by_emp_id = caller
                .emp_id
                .clone()
                .ok_or_else(ServiceError::insufficient_permissions)?;
        }

        let tx = self.conn.unchecked_transaction()?;
        let interns = SqliteInternRepository::new(&tx);
        let code = next_intern_code(&interns, now_millis())?;
        let intern = Intern::from_registration(code, input);
        interns.create_intern(&intern)?;
        let application = Application::submitted(intern.id);
        SqliteApplicationRepository::new(&tx).create_application(&application)?;
        tx.commit()?;

        info!(
            "event=intern_create module=service status=ok intern_code={}",
            intern.intern_code
        );
        let intern = SqliteInternRepository::new(self.conn)
            .get_intern(intern.id)?
            .ok_or_else(|| ServiceError::Internal("created intern not found in read-back".to_string()))?;
        let application = SqliteApplicationRepository::new(self.conn)
            .get_application(application.id)?
            .ok_or_else(|| {
                ServiceError::Internal("created application not found in read-back".to_string())
            })?
            .application;
        Ok(InternCreated {
            intern,
            application,
        })
    }

    pub fn list(
        &self,
        caller: &Caller,
        mut query: InternListQuery,
        page: PageRequest,
    ) -> ServiceResult<Page<InternSummary>> {
        if !caller.is_admin() {
            query.mentor_id = None;
        }
        let scope = access::resolve_scope(self.conn, caller)?;
        Ok(SqliteInternRepository::new(self.conn).list_interns(&query, &scope, page)?)
    }

    pub fn get(&self, caller: &Caller, id: InternId) -> ServiceResult<InternDetail> {
        let (intern, scope) = self.visible_intern(caller, id)?;
        let mentor_filter = match scope {
            Scope::Mentor(mentor_id) => Some(mentor_id),
            _ => None,
        };

        let assignment = match SqliteAssignmentRepository::new(self.conn).active_for_intern(id)? {
            Some(assignment) => SqliteMentorRepository::new(self.conn)
                .get_mentor(assignment.mentor_id)?
                .map(|mentor| ActiveMentor { assignment, mentor }),
            None => None,
        };

        Ok(InternDetail {
            assignment,
            applications: SqliteApplicationRepository::new(self.conn).list_for_intern(id)?,
            feedback: SqliteFeedbackRepository::new(self.conn).feedback_of_intern(id, mentor_filter)?,
            tasks: SqliteTaskRepository::new(self.conn).tasks_of_intern(id, mentor_filter)?,
            projects: SqliteProjectRepository::new(self.conn).projects_of_intern(id, mentor_filter)?,
            meetings: SqliteMeetingRepository::new(self.conn).meetings_of_intern(id, mentor_filter)?,
            intern,
        })
    }

    /// ADMIN, or the EMPLOYEE who referred the intern.
    pub fn update(&self, caller: &Caller, id: InternId, patch: InternPatch) -> ServiceResult<Intern> {
        caller.require_any(&[Role::Admin, Role::Employee])?;
        let (mut intern, _) = self.visible_intern(caller, id)?;
        intern.apply_patch(patch);

        let interns = SqliteInternRepository::new(self.conn);
        interns.update_intern(&intern)?;
        interns
            .get_intern(id)?
            .ok_or_else(|| ServiceError::Internal("updated intern not found in read-back".to_string()))
    }

    /// Soft delete: the intern becomes `REJECTED` and leaves its mentor.
    pub fn delete(&self, caller: &Caller, id: InternId) -> ServiceResult<()> {
        caller.require_any(&[Role::Admin])?;
        let tx = self.conn.unchecked_transaction()?;
        let interns = SqliteInternRepository::new(&tx);
        interns
            .get_intern(id)?
            .ok_or_else(|| ServiceError::not_found("Intern"))?;
        release_assignment(&tx, id)?;
        interns.set_status(id, InternStatus::Rejected)?;
        tx.commit()?;

        info!("event=intern_delete module=service status=ok mode=soft");
        Ok(())
    }

    /// Marks an `ACTIVE` intern `COMPLETED` and releases the mentor slot.
    pub fn complete(&self, caller: &Caller, id: InternId) -> ServiceResult<Intern> {
        caller.require_any(&[Role::Admin])?;
        let tx = self.conn.unchecked_transaction()?;
        let interns = SqliteInternRepository::new(&tx);
        let intern = interns
            .get_intern(id)?
            .ok_or_else(|| ServiceError::not_found("Intern"))?;
        if !intern.is_active() {
            return Err(ServiceError::invalid_state(format!(
                "Only ACTIVE interns can be completed (current status: {})",
                intern.status
            )));
        }
        release_assignment(&tx, id)?;
        interns.set_status(id, InternStatus::Completed)?;
        tx.commit()?;

        info!(
            "event=intern_complete module=service status=ok intern_code={}",
            intern.intern_code
        );
        SqliteInternRepository::new(self.conn)
            .get_intern(id)?
            .ok_or_else(|| ServiceError::Internal("completed intern not found in read-back".to_string()))
    }

    pub fn documents(&self, caller: &Caller, id: InternId) -> ServiceResult<InternDocuments> {
        let (intern, _) = self.visible_intern(caller, id)?;
        Ok(InternDocuments {
            intern_code: intern.intern_code,
            name: intern.name,
            documents: intern.documents,
        })
    }
}

/// First free intern code derived from the clock, bumping on collision.
fn next_intern_code(interns: &impl InternRepository, now_ms: i64) -> ServiceResult<String> {
    for attempt in 0..MAX_CODE_ATTEMPTS {
        let code = intern_code_from_millis(now_ms + attempt);
        if !interns.code_exists(&code)? {
            return Ok(code);
        }
    }
    Err(ServiceError::Internal(
        "could not allocate a unique intern code".to_string(),
    ))
}
