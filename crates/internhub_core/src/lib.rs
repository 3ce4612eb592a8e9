//! Core domain logic for InternHub.
//!
//! Owns the intern-program records, their SQLite storage, access rules and
//! the use-cases the HTTP server and CLI expose.

pub mod auth;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use auth::{AuthError, Claims, TokenKeys};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LogDestination, LoggingError};
pub use model::user::{NewUser, Role, User};
pub use model::ValidationError;
pub use repo::{Page, PageRequest, Pagination, RepoError, RepoResult, Scope};
pub use service::access::Caller;
pub use service::application_service::ApplicationService;
pub use service::auth_service::{AuthService, LoginResult};
pub use service::certificate_service::CertificateService;
pub use service::feedback_service::FeedbackService;
pub use service::intern_service::InternService;
pub use service::meeting_service::MeetingService;
pub use service::mentor_service::MentorService;
pub use service::project_service::ProjectService;
pub use service::task_service::TaskService;
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
