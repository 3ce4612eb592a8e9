//! Intern-to-mentor assignments.
//!
//! An intern holds at most one active assignment. Rows are never deleted on
//! release; `is_active` flips to false and a later assignment of the same pair
//! reactivates the row.

use super::intern::InternId;
use super::mentor::MentorId;
use super::require_text;
use super::ValidationResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type AssignmentId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: AssignmentId,
    pub intern_id: InternId,
    pub mentor_id: MentorId,
    pub department: String,
    pub assigned_at: i64,
    pub is_active: bool,
}

/// Request to pair an approved intern with a mentor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignment {
    pub intern_id: InternId,
    pub mentor_id: MentorId,
    pub department: String,
}

impl NewAssignment {
    pub fn validate(&self) -> ValidationResult {
        require_text("department", &self.department)
    }
}
