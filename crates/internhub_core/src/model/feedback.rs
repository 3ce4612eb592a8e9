//! Mentor feedback on an assigned intern. All scores are on a 1..=10 scale.

use super::intern::InternId;
use super::mentor::MentorId;
use super::{clean_optional, require_score, require_text, ValidationResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type FeedbackId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: FeedbackId,
    pub intern_id: InternId,
    pub mentor_id: MentorId,
    pub rating: u8,
    pub communication: u8,
    pub technical: u8,
    pub teamwork: u8,
    pub initiative: u8,
    pub comments: String,
    pub created_at: i64,
}

impl Feedback {
    pub fn record(mentor_id: MentorId, input: NewFeedback) -> Self {
        Self {
            id: Uuid::new_v4(),
            intern_id: input.intern_id,
            mentor_id,
            rating: input.rating,
            communication: input.communication,
            technical: input.technical,
            teamwork: input.teamwork,
            initiative: input.initiative,
            comments: input.comments.trim().to_string(),
            created_at: 0,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        require_score("rating", self.rating)?;
        require_score("communication", self.communication)?;
        require_score("technical", self.technical)?;
        require_score("teamwork", self.teamwork)?;
        require_score("initiative", self.initiative)?;
        require_text("comments", &self.comments)
    }

    pub fn apply_patch(&mut self, patch: FeedbackPatch) {
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
        if let Some(communication) = patch.communication {
            self.communication = communication;
        }
        if let Some(technical) = patch.technical {
            self.technical = technical;
        }
        if let Some(teamwork) = patch.teamwork {
            self.teamwork = teamwork;
        }
        if let Some(initiative) = patch.initiative {
            self.initiative = initiative;
        }
        if let Some(comments) = clean_optional(patch.comments) {
            self.comments = comments;
        }
    }
}

/// New feedback. `mentor_id` is only honoured for admin callers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeedback {
    pub intern_id: InternId,
    pub mentor_id: Option<MentorId>,
    pub rating: u8,
    pub communication: u8,
    pub technical: u8,
    pub teamwork: u8,
    pub initiative: u8,
    pub comments: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackPatch {
    pub rating: Option<u8>,
    pub communication: Option<u8>,
    pub technical: Option<u8>,
    pub teamwork: Option<u8>,
    pub initiative: Option<u8>,
    pub comments: Option<String>,
}
