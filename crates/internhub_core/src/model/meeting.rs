//! Mentor/intern meetings.
//!
//! # Invariants
//! - `time` is a 24h `HH:MM` value.
//! - `CANCELLED` and `COMPLETED` meetings never return to `SCHEDULED`.

use super::intern::InternId;
use super::mentor::MentorId;
use super::{clean_optional, require_text, ValidationError, ValidationResult};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type MeetingId = Uuid;

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").expect("valid time regex"));

text_enum! {
    pub enum MeetingKind {
        WeeklyReview => "WEEKLY_REVIEW",
        ProjectDiscussion => "PROJECT_DISCUSSION",
        FeedbackSession => "FEEDBACK_SESSION",
    }
}

text_enum! {
    pub enum MeetingStatus {
        Scheduled => "SCHEDULED",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
}

impl MeetingStatus {
    /// Whether moving from `self` to `next` is allowed.
    pub fn can_become(self, next: MeetingStatus) -> bool {
        !(self != Self::Scheduled && next == Self::Scheduled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: MeetingId,
    pub intern_id: InternId,
    pub mentor_id: MentorId,
    pub title: String,
    pub date: NaiveDate,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: MeetingKind,
    pub status: MeetingStatus,
    pub agenda: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
}

impl Meeting {
    pub fn schedule(mentor_id: MentorId, input: NewMeeting) -> Self {
        Self {
            id: Uuid::new_v4(),
            intern_id: input.intern_id,
            mentor_id,
            title: input.title.trim().to_string(),
            date: input.date,
            time: input.time.trim().to_string(),
            kind: input.kind,
            status: MeetingStatus::Scheduled,
            agenda: clean_optional(input.agenda),
            notes: None,
            created_at: 0,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        require_text("title", &self.title)?;
        if !TIME_RE.is_match(&self.time) {
            return Err(ValidationError::new("time", "must use HH:MM format"));
        }
        Ok(())
    }

    /// Applies a patch; rejects reopening a closed meeting.
    pub fn apply_patch(&mut self, patch: MeetingPatch) -> ValidationResult {
        if let Some(status) = patch.status {
            if !self.status.can_become(status) {
                return Err(ValidationError::new(
                    "status",
                    format!("a {} meeting cannot be rescheduled", self.status),
                ));
            }
            self.status = status;
        }
        if let Some(title) = clean_optional(patch.title) {
            self.title = title;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(time) = clean_optional(patch.time) {
            self.time = time;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if patch.agenda.is_some() {
            self.agenda = clean_optional(patch.agenda);
        }
        if patch.notes.is_some() {
            self.notes = clean_optional(patch.notes);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMeeting {
    pub intern_id: InternId,
    pub mentor_id: Option<MentorId>,
    pub title: String,
    pub date: NaiveDate,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: MeetingKind,
    pub agenda: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingPatch {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<MeetingKind>,
    pub status: Option<MeetingStatus>,
    pub agenda: Option<String>,
    pub notes: Option<String>,
}
