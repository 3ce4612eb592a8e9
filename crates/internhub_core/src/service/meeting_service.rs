//! Mentor/intern meeting scheduling.

use super::access::{self, Caller};
use super::{ServiceError, ServiceResult};
use crate::model::meeting::{Meeting, MeetingId, MeetingPatch, NewMeeting};
use crate::model::user::Role;
use crate::model::WithParties;
use crate::repo::meeting_repo::{MeetingListQuery, MeetingRepository, SqliteMeetingRepository};
use crate::repo::{Page, PageRequest};
use rusqlite::Connection;
use uuid::Uuid;

pub struct MeetingService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> MeetingService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn load(&self, id: MeetingId) -> ServiceResult<WithParties<Meeting>> {
        SqliteMeetingRepository::new(self.conn)
            .get_meeting(id)?
            .ok_or_else(|| ServiceError::not_found("Meeting"))
    }

    pub fn schedule(&self, caller: &Caller, input: NewMeeting) -> ServiceResult<WithParties<Meeting>> {
        Meeting::schedule(Uuid::nil(), input.clone()).validate()?;
        let mentor_id =
            access::resolve_acting_mentor(self.conn, caller, input.intern_id, input.mentor_id)?;

        let meeting = Meeting::schedule(mentor_id, input);
        SqliteMeetingRepository::new(self.conn).create_meeting(&meeting)?;
        self.load(meeting.id)
    }

    pub fn list(
        &self,
        caller: &Caller,
        query: &MeetingListQuery,
        page: PageRequest,
    ) -> ServiceResult<Page<WithParties<Meeting>>> {
        let scope = access::resolve_scope(self.conn, caller)?;
        Ok(SqliteMeetingRepository::new(self.conn).list_meetings(query, &scope, page)?)
    }

    pub fn get(&self, caller: &Caller, id: MeetingId) -> ServiceResult<WithParties<Meeting>> {
        let meeting = self.load(id)?;
        let scope = access::resolve_scope(self.conn, caller)?;
        access::ensure_record_visible(&scope, &meeting.intern, meeting.record.mentor_id)?;
        Ok(meeting)
    }

    /// Reschedules or records the outcome; closed meetings stay closed.
    pub fn update(
        &self,
        caller: &Caller,
        id: MeetingId,
        patch: MeetingPatch,
    ) -> ServiceResult<WithParties<Meeting>> {
        caller.require_any(&[Role::Admin, Role::Mentor])?;
        let current = self.load(id)?;
        access::ensure_owning_mentor(self.conn, caller, current.record.mentor_id)?;

        let mut meeting = current.record;
        meeting
            .apply_patch(patch)
            .map_err(|err| ServiceError::invalid_state(err.message))?;
        SqliteMeetingRepository::new(self.conn).update_meeting(&meeting)?;
        self.load(id)
    }

    pub fn delete(&self, caller: &Caller, id: MeetingId) -> ServiceResult<()> {
        caller.require_any(&[Role::Admin, Role::Mentor])?;
        let meeting = self.load(id)?;
        access::ensure_owning_mentor(self.conn, caller, meeting.record.mentor_id)?;
        Ok(SqliteMeetingRepository::new(self.conn).delete_meeting(id)?)
    }
}
