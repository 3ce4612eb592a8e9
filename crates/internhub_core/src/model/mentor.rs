//! Mentor records and capacity bookkeeping.
//!
//! # Invariants
//! - `max_capacity` stays within `1..=10`.
//! - `current_interns` mirrors the number of active assignments; readers
//!   reconcile it when it drifts.
//! - `UNAVAILABLE` is only set or cleared explicitly; capacity changes flip
//!   between `AVAILABLE` and `BUSY`.

use super::{
    clean_optional, require_email, require_min_chars, require_text, ValidationError,
    ValidationResult,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type MentorId = Uuid;

pub const DEFAULT_MAX_CAPACITY: u32 = 3;
pub const MAX_CAPACITY_LIMIT: u32 = 10;

text_enum! {
    /// Whether a mentor can take on more interns.
    pub enum MentorAvailability {
        Available => "AVAILABLE",
        Busy => "BUSY",
        Unavailable => "UNAVAILABLE",
    }
}

/// Canonical mentor record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mentor {
    pub id: MentorId,
    pub emp_id: String,
    pub name: String,
    pub department: String,
    pub email: String,
    pub phone: Option<String>,
    pub availability: MentorAvailability,
    pub experience: Option<String>,
    pub max_capacity: u32,
    pub current_interns: u32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Mentor {
    pub fn from_input(input: NewMentor) -> Self {
        Self {
            id: Uuid::new_v4(),
            emp_id: input.emp_id,
            name: input.name,
            department: input.department,
            email: input.email,
            phone: input.phone,
            availability: MentorAvailability::Available,
            experience: input.experience,
            max_capacity: input.max_capacity.unwrap_or(DEFAULT_MAX_CAPACITY),
            current_interns: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        require_text("empId", &self.emp_id)?;
        require_min_chars("name", &self.name, 2)?;
        require_text("department", &self.department)?;
        require_email("email", &self.email)?;
        if !(1..=MAX_CAPACITY_LIMIT).contains(&self.max_capacity) {
            return Err(ValidationError::new(
                "maxCapacity",
                format!("must be between 1 and {MAX_CAPACITY_LIMIT}"),
            ));
        }
        Ok(())
    }

    /// Whether one more intern fits given `active` current assignments.
    pub fn has_capacity(&self, active: u32) -> bool {
        active < self.max_capacity
    }

    /// Updates load and availability for a fresh active-assignment count.
    pub fn reconcile_load(&mut self, active: u32) {
        self.current_interns = active;
        self.availability = derive_availability(self.availability, active, self.max_capacity);
    }

    pub fn apply_patch(&mut self, patch: MentorPatch) {
        if let Some(name) = clean_optional(patch.name) {
            self.name = name;
        }
        if let Some(department) = clean_optional(patch.department) {
            self.department = department;
        }
        if let Some(email) = clean_optional(patch.email) {
            self.email = email.to_lowercase();
        }
        if patch.phone.is_some() {
            self.phone = clean_optional(patch.phone);
        }
        if patch.experience.is_some() {
            self.experience = clean_optional(patch.experience);
        }
        if let Some(availability) = patch.availability {
            self.availability = availability;
        }
        if let Some(max_capacity) = patch.max_capacity {
            self.max_capacity = max_capacity;
        }
    }
}

/// Derives availability from load.
///
/// - At or above capacity -> `BUSY`.
/// - `BUSY` with spare capacity -> `AVAILABLE`.
/// - `UNAVAILABLE` is kept as is.
pub fn derive_availability(
    current: MentorAvailability,
    active: u32,
    max_capacity: u32,
) -> MentorAvailability {
    match current {
        MentorAvailability::Unavailable => MentorAvailability::Unavailable,
        _ if active >= max_capacity => MentorAvailability::Busy,
        MentorAvailability::Busy => MentorAvailability::Available,
        MentorAvailability::Available => MentorAvailability::Available,
    }
}

/// Input for registering a mentor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMentor {
    pub emp_id: String,
    pub name: String,
    pub department: String,
    pub email: String,
    pub phone: Option<String>,
    pub experience: Option<String>,
    pub max_capacity: Option<u32>,
}

impl NewMentor {
    pub fn normalized(self) -> Self {
        Self {
            emp_id: self.emp_id.trim().to_string(),
            name: self.name.trim().to_string(),
            department: self.department.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: clean_optional(self.phone),
            experience: clean_optional(self.experience),
            max_capacity: self.max_capacity,
        }
    }
}

/// Partial update for a mentor. `current_interns` is derived, never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorPatch {
    pub name: Option<String>,
    pub department: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub experience: Option<String>,
    pub availability: Option<MentorAvailability>,
    pub max_capacity: Option<u32>,
}

/// Period of one actively assigned intern, as shown on mentor listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternDuration {
    pub intern_name: String,
    pub intern_code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Mentor listing entry with reconciled load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorOverview {
    #[serde(flatten)]
    pub mentor: Mentor,
    pub intern_durations: Vec<InternDuration>,
}

#[cfg(test)]
mod tests {
    use super::{derive_availability, Mentor, MentorAvailability, NewMentor};

    fn mentor(max_capacity: Option<u32>) -> Mentor {
        Mentor::from_input(
            NewMentor {
                emp_id: "EMP100".to_string(),
                name: "Meera Iyer".to_string(),
                department: "Engineering".to_string(),
                email: "Meera@IOCL.in".to_string(),
                phone: None,
                experience: None,
                max_capacity,
            }
            .normalized(),
        )
    }

    #[test]
    fn defaults_to_three_slots_and_available() {
        let mentor = mentor(None);
        assert_eq!(mentor.max_capacity, 3);
        assert_eq!(mentor.availability, MentorAvailability::Available);
        assert_eq!(mentor.email, "meera@iocl.in");
        assert!(mentor.validate().is_ok());
    }

    #[test]
    fn capacity_outside_bounds_is_invalid() {
        assert_eq!(mentor(Some(0)).validate().unwrap_err().field, "maxCapacity");
        assert_eq!(mentor(Some(11)).validate().unwrap_err().field, "maxCapacity");
    }

    #[test]
    fn availability_flips_with_load_but_unavailable_is_sticky() {
        use MentorAvailability::{Available, Busy, Unavailable};
        assert_eq!(derive_availability(Available, 3, 3), Busy);
        assert_eq!(derive_availability(Busy, 2, 3), Available);
        assert_eq!(derive_availability(Available, 1, 3), Available);
        assert_eq!(derive_availability(Unavailable, 0, 3), Unavailable);
        assert_eq!(derive_availability(Unavailable, 5, 3), Unavailable);
    }

    #[test]
    fn reconcile_load_updates_count_and_availability() {
        let mut mentor = mentor(Some(2));
        mentor.reconcile_load(2);
        assert_eq!(mentor.current_interns, 2);
        assert_eq!(mentor.availability, MentorAvailability::Busy);
        assert!(!mentor.has_capacity(2));
        mentor.reconcile_load(1);
        assert_eq!(mentor.availability, MentorAvailability::Available);
        assert!(mentor.has_capacity(1));
    }
}
