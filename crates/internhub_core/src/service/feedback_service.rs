//! Mentor feedback on assigned interns.

use super::access::{self, Caller};
use super::{ServiceError, ServiceResult};
use crate::model::feedback::{Feedback, FeedbackId, FeedbackPatch, NewFeedback};
use crate::model::user::Role;
use crate::model::WithParties;
use crate::repo::feedback_repo::{FeedbackListQuery, FeedbackRepository, SqliteFeedbackRepository};
use crate::repo::{Page, PageRequest};
use rusqlite::Connection;
use uuid::Uuid;

pub struct FeedbackService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> FeedbackService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn load(&self, id: FeedbackId) -> ServiceResult<WithParties<Feedback>> {
        SqliteFeedbackRepository::new(self.conn)
            .get_feedback(id)?
            .ok_or_else(|| ServiceError::not_found("Feedback"))
    }

    /// Records feedback for an intern actively assigned to the acting mentor.
    pub fn create(&self, caller: &Caller, input: NewFeedback) -> ServiceResult<WithParties<Feedback>> {
        let feedback = Feedback::record(Uuid::nil(), input.clone());
        feedback.validate()?;
        let mentor_id =
            access::resolve_acting_mentor(self.conn, caller, input.intern_id, input.mentor_id)?;

        let feedback = Feedback::record(mentor_id, input);
        SqliteFeedbackRepository::new(self.conn).create_feedback(&feedback)?;
        self.load(feedback.id)
    }

    pub fn list(
        &self,
        caller: &Caller,
        query: &FeedbackListQuery,
        page: PageRequest,
    ) -> ServiceResult<Page<WithParties<Feedback>>> {
        let scope = access::resolve_scope(self.conn, caller)?;
        Ok(SqliteFeedbackRepository::new(self.conn).list_feedback(query, &scope, page)?)
    }

    pub fn get(&self, caller: &Caller, id: FeedbackId) -> ServiceResult<WithParties<Feedback>> {
        let feedback = self.load(id)?;
        let scope = access::resolve_scope(self.conn, caller)?;
        access::ensure_record_visible(&scope, &feedback.intern, feedback.record.mentor_id)?;
        Ok(feedback)
    }

    pub fn update(
        &self,
        caller: &Caller,
        id: FeedbackId,
        patch: FeedbackPatch,
    ) -> ServiceResult<WithParties<Feedback>> {
        caller.require_any(&[Role::Admin, Role::Mentor])?;
        let current = self.load(id)?;
        access::ensure_owning_mentor(self.conn, caller, current.record.mentor_id)?;

        let mut feedback = current.record;
        feedback.apply_patch(patch);
        SqliteFeedbackRepository::new(self.conn).update_feedback(&feedback)?;
        self.load(id)
    }

    pub fn delete(&self, caller: &Caller, id: FeedbackId) -> ServiceResult<()> {
        caller.require_any(&[Role::Admin, Role::Mentor])?;
        let feedback = self.load(id)?;
        access::ensure_owning_mentor(self.conn, caller, feedback.record.mentor_id)?;
        Ok(SqliteFeedbackRepository::new(self.conn).delete_feedback(id)?)
    }
}
