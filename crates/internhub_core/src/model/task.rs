//! Tasks a mentor hands to an assigned intern.

use super::intern::InternId;
use super::mentor::MentorId;
use super::{clean_optional, require_min_chars, require_text, ValidationResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TaskId = Uuid;

text_enum! {
    pub enum TaskStatus {
        Pending => "PENDING",
        InProgress => "IN_PROGRESS",
        Completed => "COMPLETED",
    }
}

text_enum! {
    pub enum TaskPriority {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        Self::Medium
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub intern_id: InternId,
    pub mentor_id: MentorId,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Task {
    pub fn assign(mentor_id: MentorId, input: NewTask) -> Self {
        Self {
            id: Uuid::new_v4(),
            intern_id: input.intern_id,
            mentor_id,
            title: input.title.trim().to_string(),
            description: input.description.trim().to_string(),
            due_date: input.due_date,
            status: TaskStatus::Pending,
            priority: input.priority.unwrap_or_default(),
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        require_min_chars("title", &self.title, 3)?;
        require_text("description", &self.description)
    }

    pub fn apply_patch(&mut self, patch: TaskPatch) {
        if let Some(title) = clean_optional(patch.title) {
            self.title = title;
        }
        if let Some(description) = clean_optional(patch.description) {
            self.description = description;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub intern_id: InternId,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub priority: Option<TaskPriority>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl TaskPatch {
    /// Keeps only the status change; interns may not edit anything else.
    pub fn status_only(self) -> Self {
        Self {
            status: self.status,
            ..Self::default()
        }
    }
}
