//! Intern records.
//!
//! # Invariants
//! - `intern_code` (`IOCL-NNNNNN`) is unique and never reassigned.
//! - `end_date` is strictly after `start_date`.
//! - `status` only changes through application review, mentor assignment,
//!   completion or soft delete; generic patches cannot touch it.

use super::{
    clean_optional, require_email, require_min_chars, require_text, ValidationError,
    ValidationResult,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub type InternId = Uuid;

/// Prefix for human-facing intern codes.
pub const INTERN_CODE_PREFIX: &str = "IOCL-";

text_enum! {
    /// Lifecycle state of an intern.
    pub enum InternStatus {
        Submitted => "SUBMITTED",
        UnderReview => "UNDER_REVIEW",
        Approved => "APPROVED",
        Rejected => "REJECTED",
        Active => "ACTIVE",
        Completed => "COMPLETED",
    }
}

/// Canonical intern record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Intern {
    pub id: InternId,
    pub intern_code: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub institute: String,
    pub course: String,
    pub semester: String,
    pub roll_number: String,
    pub department: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub address: String,
    /// Document name -> stored location.
    pub documents: BTreeMap<String, String>,
    pub status: InternStatus,
    pub referred_by: String,
    pub referred_by_emp_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Intern {
    /// Builds an unsaved intern from registration input.
    pub fn from_registration(intern_code: String, input: NewIntern) -> Self {
        Self {
            id: Uuid::new_v4(),
            intern_code,
            name: input.name,
            email: input.email,
            phone: input.phone,
            institute: input.institute,
            course: input.course,
            semester: input.semester,
            roll_number: input.roll_number,
            department: input.department,
            start_date: input.start_date,
            end_date: input.end_date,
            address: input.address,
            documents: input.documents,
            status: InternStatus::Submitted,
            referred_by: input.referred_by,
            referred_by_emp_id: input.referred_by_emp_id,
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        require_min_chars("name", &self.name, 2)?;
        require_email("email", &self.email)?;
        require_text("phone", &self.phone)?;
        require_text("institute", &self.institute)?;
        require_text("course", &self.course)?;
        require_text("semester", &self.semester)?;
        require_text("rollNumber", &self.roll_number)?;
        require_text("department", &self.department)?;
        require_text("address", &self.address)?;
        require_text("referredBy", &self.referred_by)?;
        require_text("referredByEmpId", &self.referred_by_emp_id)?;
        validate_period(self.start_date, self.end_date)
    }

    /// Applies a partial update in place. Identity and status are untouched.
    pub fn apply_patch(&mut self, patch: InternPatch) {
        let patch = patch.normalized();
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(institute) = patch.institute {
            self.institute = institute;
        }
        if let Some(course) = patch.course {
            self.course = course;
        }
        if let Some(semester) = patch.semester {
            self.semester = semester;
        }
        if let Some(roll_number) = patch.roll_number {
            self.roll_number = roll_number;
        }
        if let Some(department) = patch.department {
            self.department = department;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = end_date;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(documents) = patch.documents {
            self.documents = documents;
        }
        if let Some(referred_by) = patch.referred_by {
            self.referred_by = referred_by;
        }
    }

    /// Whether the intern currently occupies a mentor slot.
    pub fn is_active(&self) -> bool {
        self.status == InternStatus::Active
    }
}

/// Registration input for a new intern.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIntern {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub institute: String,
    pub course: String,
    pub semester: String,
    pub roll_number: String,
    pub department: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub address: String,
    #[serde(default)]
    pub documents: BTreeMap<String, String>,
    pub referred_by: String,
    pub referred_by_emp_id: String,
}

impl NewIntern {
    /// Trims all text fields and lowercases the e-mail address.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: self.phone.trim().to_string(),
            institute: self.institute.trim().to_string(),
            course: self.course.trim().to_string(),
            semester: self.semester.trim().to_string(),
            roll_number: self.roll_number.trim().to_string(),
            department: self.department.trim().to_string(),
            start_date: self.start_date,
            end_date: self.end_date,
            address: self.address.trim().to_string(),
            documents: self.documents,
            referred_by: self.referred_by.trim().to_string(),
            referred_by_emp_id: self.referred_by_emp_id.trim().to_string(),
        }
    }
}

/// Partial update for an intern. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub institute: Option<String>,
    pub course: Option<String>,
    pub semester: Option<String>,
    pub roll_number: Option<String>,
    pub department: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub documents: Option<BTreeMap<String, String>>,
    pub referred_by: Option<String>,
}

impl InternPatch {
    fn normalized(self) -> Self {
        Self {
            name: clean_optional(self.name),
            email: clean_optional(self.email).map(|email| email.to_lowercase()),
            phone: clean_optional(self.phone),
            institute: clean_optional(self.institute),
            course: clean_optional(self.course),
            semester: clean_optional(self.semester),
            roll_number: clean_optional(self.roll_number),
            department: clean_optional(self.department),
            start_date: self.start_date,
            end_date: self.end_date,
            address: clean_optional(self.address),
            documents: self.documents,
            referred_by: clean_optional(self.referred_by),
        }
    }
}

/// Formats an intern code from a millisecond clock reading.
pub fn intern_code_from_millis(epoch_ms: i64) -> String {
    format!("{INTERN_CODE_PREFIX}{:06}", epoch_ms.rem_euclid(1_000_000))
}

fn validate_period(start: NaiveDate, end: NaiveDate) -> ValidationResult {
    if end <= start {
        return Err(ValidationError::new(
            "endDate",
            "must be after the start date",
        ));
    }
    Ok(())
}
