//! Use-case services over repositories.
//!
//! # Responsibility
//! - Enforce role and ownership rules for every operation.
//! - Run multi-record state changes (review cascades, mentor assignment)
//!   inside one SQLite transaction.
//!
//! # Invariants
//! - Services never return records outside the caller's scope.
//! - Created or updated records are read back before being returned.

pub mod access;
pub mod application_service;
pub mod auth_service;
pub mod certificate_service;
pub mod feedback_service;
pub mod intern_service;
pub mod meeting_service;
pub mod mentor_service;
pub mod project_service;
pub mod task_service;

use crate::auth::AuthError;
use crate::model::ValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error shared by all use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Input failed field validation.
    Validation(ValidationError),
    /// Target record does not exist.
    NotFound(String),
    /// Caller lacks the role or ownership for the operation.
    Forbidden(String),
    /// Write would violate a uniqueness rule.
    Conflict(String),
    /// Record is not in a state that permits the operation.
    InvalidState(String),
    /// Credentials or token are not acceptable.
    Unauthorized(String),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch or backend failure.
    Internal(String),
}

impl ServiceError {
    pub(crate) fn not_found(entity: &str) -> Self {
        Self::NotFound(format!("{entity} not found"))
    }

    pub(crate) fn access_denied() -> Self {
        Self::Forbidden("Access denied".to_string())
    }

    pub(crate) fn insufficient_permissions() -> Self {
        Self::Forbidden("Insufficient permissions".to_string())
    }

    pub(crate) fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(message)
            | Self::Forbidden(message)
            | Self::Conflict(message)
            | Self::InvalidState(message)
            | Self::Unauthorized(message) => write!(f, "{message}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Internal(message) => write!(f, "internal error: {message}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound { entity, .. } => Self::not_found(entity),
            RepoError::Conflict(message) => Self::Conflict(message),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(value: rusqlite::Error) -> Self {
        RepoError::from(value).into()
    }
}

impl From<AuthError> for ServiceError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::InvalidToken | AuthError::ExpiredToken => {
                Self::Unauthorized("Invalid or expired token".to_string())
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
