//! Domain model for the internship program.
//!
//! # Responsibility
//! - Define canonical records for people (users, interns, mentors) and the
//!   workflow documents that hang off an intern/mentor pair.
//! - Own field-level validation; repositories call `validate()` before writes.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Enumerated states serialize to the SCREAMING_SNAKE_CASE wire names.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Declares a closed text-backed enum with stable storage/wire names.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $text)] $variant),+
        }

        impl $name {
            /// Stable storage and wire name.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            /// Parses a stored/wire name; `None` for unknown values.
            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub mod application;
pub mod assignment;
pub mod certificate;
pub mod feedback;
pub mod intern;
pub mod meeting;
pub mod mentor;
pub mod project;
pub mod task;
pub mod user;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex")
});

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl Error for ValidationError {}

pub(crate) type ValidationResult = Result<(), ValidationError>;

pub(crate) fn require_text(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    Ok(())
}

pub(crate) fn require_min_chars(field: &'static str, value: &str, min: usize) -> ValidationResult {
    if value.trim().chars().count() < min {
        return Err(ValidationError::new(
            field,
            format!("must be at least {min} characters"),
        ));
    }
    Ok(())
}

pub(crate) fn require_email(field: &'static str, value: &str) -> ValidationResult {
    if !EMAIL_RE.is_match(value.trim()) {
        return Err(ValidationError::new(field, "invalid email format"));
    }
    Ok(())
}

pub(crate) fn require_score(field: &'static str, value: u8) -> ValidationResult {
    if !(1..=10).contains(&value) {
        return Err(ValidationError::new(field, "must be between 1 and 10"));
    }
    Ok(())
}

/// Trims an optional text value and collapses blanks to `None`.
pub(crate) fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Compact intern identity attached to workflow read models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternRef {
    pub id: Uuid,
    pub intern_code: String,
    pub name: String,
    pub department: String,
    #[serde(skip)]
    pub referred_by_emp_id: String,
}

/// Compact mentor identity attached to workflow read models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorRef {
    pub id: Uuid,
    pub emp_id: String,
    pub name: String,
}

/// A workflow record together with the intern and mentor it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithParties<T> {
    #[serde(flatten)]
    pub record: T,
    pub intern: InternRef,
    pub mentor: MentorRef,
}
