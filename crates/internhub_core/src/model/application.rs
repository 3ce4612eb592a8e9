//! Internship applications.
//!
//! # Invariants
//! - Every intern has at most one application, created with the intern.
//! - `APPROVED` and `REJECTED` are final; a decided application is never
//!   reviewed again.

use super::intern::{InternId, InternStatus};
use super::user::UserId;
use super::{clean_optional, ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ApplicationId = Uuid;

text_enum! {
    /// Review state of an application.
    pub enum ApplicationStatus {
        Submitted => "SUBMITTED",
        UnderReview => "UNDER_REVIEW",
        Approved => "APPROVED",
        Rejected => "REJECTED",
    }
}

impl ApplicationStatus {
    /// Whether a review decision has been recorded.
    pub fn is_decided(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Intern status that follows from this application status, if any.
    pub fn cascaded_intern_status(self) -> Option<InternStatus> {
        match self {
            Self::Approved => Some(InternStatus::Approved),
            Self::Rejected => Some(InternStatus::Rejected),
            Self::Submitted | Self::UnderReview => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub intern_id: InternId,
    pub status: ApplicationStatus,
    pub reviewed_by: Option<UserId>,
    pub review_notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Application {
    /// Builds an unsaved `SUBMITTED` application for an intern.
    pub fn submitted(intern_id: InternId) -> Self {
        Self {
            id: Uuid::new_v4(),
            intern_id,
            status: ApplicationStatus::Submitted,
            reviewed_by: None,
            review_notes: None,
            created_at: 0,
            updated_at: 0,
        }
    }
}

/// Reviewer decision for an application.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationReview {
    pub status: ApplicationStatus,
    pub review_notes: Option<String>,
}

impl ApplicationReview {
    pub fn normalized(self) -> Self {
        Self {
            status: self.status,
            review_notes: clean_optional(self.review_notes),
        }
    }

    pub fn validate(&self) -> ValidationResult {
        if self.status == ApplicationStatus::Submitted {
            return Err(ValidationError::new(
                "status",
                "a review must move the application out of SUBMITTED",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ApplicationReview, ApplicationStatus};
    use crate::model::intern::InternStatus;

    #[test]
    fn only_decisions_cascade_to_interns() {
        assert_eq!(
            ApplicationStatus::Approved.cascaded_intern_status(),
            Some(InternStatus::Approved)
        );
        assert_eq!(
            ApplicationStatus::Rejected.cascaded_intern_status(),
            Some(InternStatus::Rejected)
        );
        assert_eq!(ApplicationStatus::UnderReview.cascaded_intern_status(), None);
        assert!(!ApplicationStatus::UnderReview.is_decided());
        assert!(ApplicationStatus::Rejected.is_decided());
    }

    #[test]
    fn review_cannot_reset_to_submitted() {
        let review = ApplicationReview {
            status: ApplicationStatus::Submitted,
            review_notes: Some("  ".to_string()),
        }
        .normalized();
        assert_eq!(review.review_notes, None);
        assert_eq!(review.validate().unwrap_err().field, "status");
    }
}
