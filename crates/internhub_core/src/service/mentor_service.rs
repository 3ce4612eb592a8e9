//! Mentor directory and capacity-aware assignment.
//!
//! # Invariants
//! - `current_interns` is recomputed from active assignments whenever a
//!   mentor is listed, assigned or released, and written back when stale.
//! - Assignment and release change intern status, assignment row and mentor
//!   load in one transaction.

use super::access::{self, Caller};
use super::{ServiceError, ServiceResult};
use crate::model::assignment::{Assignment, NewAssignment};
use crate::model::feedback::Feedback;
use crate::model::intern::{Intern, InternId, InternStatus};
use crate::model::meeting::Meeting;
use crate::model::mentor::{
    Mentor, MentorAvailability, MentorId, MentorOverview, MentorPatch, NewMentor,
};
use crate::model::project::Project;
use crate::model::task::Task;
use crate::model::user::Role;
use crate::repo::assignment_repo::{AssignmentRepository, SqliteAssignmentRepository};
use crate::repo::feedback_repo::{FeedbackRepository, SqliteFeedbackRepository};
use crate::repo::intern_repo::{InternRepository, SqliteInternRepository};
use crate::repo::meeting_repo::{MeetingRepository, SqliteMeetingRepository};
use crate::repo::mentor_repo::{MentorRepository, SqliteMentorRepository};
use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use crate::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use log::info;
use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

/// Result of pairing an intern with a mentor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentResult {
    pub assignment: Assignment,
    pub intern: Intern,
    pub mentor: Mentor,
}

/// An intern actively mentored by one mentor, with that mentor's records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentoredIntern {
    #[serde(flatten)]
    pub intern: Intern,
    pub assigned_at: i64,
    pub tasks: Vec<Task>,
    pub feedback: Vec<Feedback>,
    pub projects: Vec<Project>,
    pub meetings: Vec<Meeting>,
}

pub struct MentorService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> MentorService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Mentors sorted by name, each with reconciled load and active interns.
    pub fn list(
        &self,
        department: Option<&str>,
        availability: Option<MentorAvailability>,
    ) -> ServiceResult<Vec<MentorOverview>> {
        let mentors = SqliteMentorRepository::new(self.conn);
        let mut overviews = Vec::new();
        for mentor in mentors.list_mentors(department)? {
            let mentor = reconcile_mentor(self.conn, mentor)?;
            if availability.is_some_and(|wanted| wanted != mentor.availability) {
                continue;
            }
            let intern_durations = mentors.active_intern_durations(mentor.id)?;
            overviews.push(MentorOverview {
                mentor,
                intern_durations,
            });
        }
        Ok(overviews)
    }

    /// Mentors of a department with a free slot, least loaded first.
    pub fn available(&self, caller: &Caller, department: &str) -> ServiceResult<Vec<Mentor>> {
        caller.require_any(&[Role::Admin])?;
        let assignments = SqliteAssignmentRepository::new(self.conn);
        let mut available = Vec::new();
        for mentor in SqliteMentorRepository::new(self.conn).list_mentors(Some(department))? {
            let mentor = reconcile_mentor(self.conn, mentor)?;
            if mentor.availability == MentorAvailability::Unavailable {
                continue;
            }
            if mentor.has_capacity(assignments.count_active_for_mentor(mentor.id)?) {
                available.push(mentor);
            }
        }
        available.sort_by(|a, b| {
            a.current_interns
                .cmp(&b.current_interns)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(available)
    }

    pub fn create(&self, caller: &Caller, input: NewMentor) -> ServiceResult<Mentor> {
        caller.require_any(&[Role::Admin])?;
        let mentor = Mentor::from_input(input.normalized());
        mentor.validate()?;

        let mentors = SqliteMentorRepository::new(self.conn);
        if mentors.find_by_emp_id(&mentor.emp_id)?.is_some() {
            return Err(duplicate_mentor());
        }
        mentors.create_mentor(&mentor).map_err(|err| match ServiceError::from(err) {
            ServiceError::Conflict(_) => duplicate_mentor(),
            other => other,
        })?;
        info!("event=mentor_create module=service status=ok");

        mentors
            .get_mentor(mentor.id)?
            .ok_or_else(|| ServiceError::Internal("created mentor not found in read-back".to_string()))
    }

    /// Applies a patch and re-derives availability from the live load.
    pub fn update(&self, caller: &Caller, id: MentorId, patch: MentorPatch) -> ServiceResult<Mentor> {
        caller.require_any(&[Role::Admin])?;
        let mentors = SqliteMentorRepository::new(self.conn);
        let mut mentor = mentors
            .get_mentor(id)?
            .ok_or_else(|| ServiceError::not_found("Mentor"))?;
        mentor.apply_patch(patch);
        mentor.validate()?;

        let active = SqliteAssignmentRepository::new(self.conn).count_active_for_mentor(id)?;
        mentor.reconcile_load(active);
        mentors.update_mentor(&mentor)?;
        mentors
            .get_mentor(id)?
            .ok_or_else(|| ServiceError::Internal("updated mentor not found in read-back".to_string()))
    }

    /// Deletes a mentor with no active interns and no workflow history.
    pub fn delete(&self, caller: &Caller, id: MentorId) -> ServiceResult<()> {
        caller.require_any(&[Role::Admin])?;
        let mentors = SqliteMentorRepository::new(self.conn);
        mentors
            .get_mentor(id)?
            .ok_or_else(|| ServiceError::not_found("Mentor"))?;

        if SqliteAssignmentRepository::new(self.conn).count_active_for_mentor(id)? > 0 {
            return Err(ServiceError::invalid_state(
                "Cannot delete mentor with active intern assignments",
            ));
        }
        if mentors.history_count(id)? > 0 {
            return Err(ServiceError::invalid_state(
                "Cannot delete mentor with recorded tasks, projects, feedback or meetings",
            ));
        }
        mentors.delete_mentor(id)?;
        info!("event=mentor_delete module=service status=ok");
        Ok(())
    }

    /// Pairs an approved intern with a mentor that has a free slot.
    pub fn assign(&self, caller: &Caller, input: NewAssignment) -> ServiceResult<AssignmentResult> {
        caller.require_any(&[Role::Admin])?;
        input.validate()?;
        let department = input.department.trim();

        let tx = self.conn.unchecked_transaction()?;
        let interns = SqliteInternRepository::new(&tx);
        let mentors = SqliteMentorRepository::new(&tx);
        let assignments = SqliteAssignmentRepository::new(&tx);

        let intern = interns
            .get_intern(input.intern_id)?
            .ok_or_else(|| ServiceError::not_found("Intern"))?;
        if intern.status != InternStatus::Approved {
            return Err(ServiceError::invalid_state(format!(
                "Intern must be APPROVED before mentor assignment (current status: {})",
                intern.status
            )));
        }
        let mut mentor = mentors
            .get_mentor(input.mentor_id)?
            .ok_or_else(|| ServiceError::not_found("Mentor"))?;
        if mentor.availability == MentorAvailability::Unavailable {
            return Err(ServiceError::invalid_state("Mentor is unavailable"));
        }
        let active = assignments.count_active_for_mentor(mentor.id)?;
        if !mentor.has_capacity(active) {
            return Err(ServiceError::invalid_state(format!(
                "Mentor has reached maximum capacity ({}/{})",
                active, mentor.max_capacity
            )));
        }
        if assignments.active_for_intern(intern.id)?.is_some() {
            return Err(ServiceError::Conflict(
                "Intern already has an active mentor assignment".to_string(),
            ));
        }

        let assignment_id = match assignments.find_pair(intern.id, mentor.id)? {
            Some(existing) => {
                assignments.reactivate(existing.id, department)?;
                existing.id
            }
            None => {
                let assignment = Assignment {
                    id: Uuid::new_v4(),
                    intern_id: intern.id,
                    mentor_id: mentor.id,
                    department: department.to_string(),
                    assigned_at: 0,
                    is_active: true,
                };
                assignments.create_assignment(&assignment)?
            }
        };
        interns.set_status(intern.id, InternStatus::Active)?;
        mentor.reconcile_load(active + 1);
        mentors.update_mentor(&mentor)?;

        let assignment = assignments
            .active_for_intern(intern.id)?
            .filter(|assignment| assignment.id == assignment_id)
            .ok_or_else(|| ServiceError::Internal("assignment not found in read-back".to_string()))?;
        let intern = interns
            .get_intern(intern.id)?
            .ok_or_else(|| ServiceError::Internal("assigned intern not found in read-back".to_string()))?;
        let mentor = mentors
            .get_mentor(mentor.id)?
            .ok_or_else(|| ServiceError::Internal("assigned mentor not found in read-back".to_string()))?;
        tx.commit()?;

        info!(
            "event=mentor_assign module=service status=ok load={}/{} availability={}",
            mentor.current_interns, mentor.max_capacity, mentor.availability
        );
        Ok(AssignmentResult {
            assignment,
            intern,
            mentor,
        })
    }

    /// Ends an intern's active assignment; the intern returns to `APPROVED`.
    pub fn unassign(&self, caller: &Caller, intern_id: InternId) -> ServiceResult<()> {
        caller.require_any(&[Role::Admin])?;
        let tx = self.conn.unchecked_transaction()?;
        if release_assignment(&tx, intern_id)?.is_none() {
            return Err(ServiceError::NotFound(
                "No active assignment found for this intern".to_string(),
            ));
        }
        SqliteInternRepository::new(&tx).set_status(intern_id, InternStatus::Approved)?;
        tx.commit()?;
        info!("event=mentor_unassign module=service status=ok");
        Ok(())
    }

    /// Active interns of a mentor with the records that mentor created.
    pub fn interns_of(&self, caller: &Caller, mentor_id: MentorId) -> ServiceResult<Vec<MentoredIntern>> {
        caller.require_any(&[Role::Admin, Role::Mentor])?;
        SqliteMentorRepository::new(self.conn)
            .get_mentor(mentor_id)?
            .ok_or_else(|| ServiceError::not_found("Mentor"))?;
        access::ensure_owning_mentor(self.conn, caller, mentor_id)?;

        let tasks = SqliteTaskRepository::new(self.conn);
        let feedback = SqliteFeedbackRepository::new(self.conn);
        let projects = SqliteProjectRepository::new(self.conn);
        let meetings = SqliteMeetingRepository::new(self.conn);
        let mut mentored = Vec::new();
        for assigned in SqliteAssignmentRepository::new(self.conn).active_interns_of(mentor_id)? {
            let intern_id = assigned.intern.id;
            mentored.push(MentoredIntern {
                intern: assigned.intern,
                assigned_at: assigned.assigned_at,
                tasks: tasks.tasks_of_intern(intern_id, Some(mentor_id))?,
                feedback: feedback.feedback_of_intern(intern_id, Some(mentor_id))?,
                projects: projects.projects_of_intern(intern_id, Some(mentor_id))?,
                meetings: meetings.meetings_of_intern(intern_id, Some(mentor_id))?,
            });
        }
        Ok(mentored)
    }
}

/// Deactivates the intern's active assignment, if any, and recomputes the
/// mentor's load. Returns the released mentor id.
pub(crate) fn release_assignment(
    conn: &Connection,
    intern_id: InternId,
) -> ServiceResult<Option<MentorId>> {
    let assignments = SqliteAssignmentRepository::new(conn);
    let Some(active) = assignments.active_for_intern(intern_id)? else {
        return Ok(None);
    };
    assignments.deactivate(active.id)?;

    let mentors = SqliteMentorRepository::new(conn);
    if let Some(mentor) = mentors.get_mentor(active.mentor_id)? {
        reconcile_mentor(conn, mentor)?;
    }
    Ok(Some(active.mentor_id))
}

/// Recounts active assignments and persists load/availability when they drifted.
fn reconcile_mentor(conn: &Connection, mut mentor: Mentor) -> ServiceResult<Mentor> {
    let active = SqliteAssignmentRepository::new(conn).count_active_for_mentor(mentor.id)?;
    let before = (mentor.current_interns, mentor.availability);
    mentor.reconcile_load(active);
    if before != (mentor.current_interns, mentor.availability) {
        SqliteMentorRepository::new(conn).update_mentor(&mentor)?;
        info!(
            "event=mentor_reconcile module=service status=ok load={}/{}",
            mentor.current_interns, mentor.max_capacity
        );
    }
    Ok(mentor)
}

fn duplicate_mentor() -> ServiceError {
    ServiceError::Conflict("Mentor with this employee id already exists".to_string())
}
