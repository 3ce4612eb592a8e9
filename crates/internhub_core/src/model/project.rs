//! Intern project submissions and their review.

use super::intern::InternId;
use super::mentor::MentorId;
use super::{clean_optional, require_min_chars, ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ProjectId = Uuid;

/// File name every uploaded project report is stored under.
pub const REPORT_FILE_NAME: &str = "project-report.pdf";

text_enum! {
    pub enum ProjectStatus {
        Submitted => "SUBMITTED",
        UnderReview => "UNDER_REVIEW",
        Approved => "APPROVED",
        Rejected => "REJECTED",
    }
}

impl ProjectStatus {
    pub fn is_decided(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub intern_id: InternId,
    pub mentor_id: MentorId,
    pub title: String,
    pub description: Option<String>,
    pub file_url: Option<String>,
    pub status: ProjectStatus,
    pub feedback: Option<String>,
    pub grade: Option<String>,
    pub submitted_at: i64,
    pub reviewed_at: Option<i64>,
}

impl Project {
    pub fn submitted(intern_id: InternId, mentor_id: MentorId, input: NewProject) -> Self {
        Self {
            id: Uuid::new_v4(),
            intern_id,
            mentor_id,
            title: input.title.trim().to_string(),
            description: clean_optional(input.description),
            file_url: None,
            status: ProjectStatus::Submitted,
            feedback: None,
            grade: None,
            submitted_at: 0,
            reviewed_at: None,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        require_min_chars("title", &self.title, 5)
    }
}

/// Submission input. Interns may omit `intern_id`; it defaults to their own.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub intern_id: Option<InternId>,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReview {
    pub status: ProjectStatus,
    pub feedback: Option<String>,
    pub grade: Option<String>,
}

impl ProjectReview {
    pub fn normalized(self) -> Self {
        Self {
            status: self.status,
            feedback: clean_optional(self.feedback),
            grade: clean_optional(self.grade),
        }
    }

    pub fn validate(&self) -> ValidationResult {
        if self.status == ProjectStatus::Submitted {
            return Err(ValidationError::new(
                "status",
                "a review must move the project out of SUBMITTED",
            ));
        }
        Ok(())
    }
}

/// Public location of a project's uploaded report.
pub fn report_url(project_id: ProjectId) -> String {
    format!("/uploads/projects/{project_id}/{REPORT_FILE_NAME}")
}
