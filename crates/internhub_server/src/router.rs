//! Router construction for the InternHub server.

use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::{
    middleware as axum_mw,
    routing::{get, post, put},
    Extension, Router,
};
use internhub_core::model::project::REPORT_FILE_NAME;
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::middleware::access_log::log_request;
use crate::middleware::auth::require_auth;
use crate::state::AppState;

/// Multipart framing allowance on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the full axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let config = state.config();
    let upload_limit = config.max_file_size.saturating_add(MULTIPART_OVERHEAD);
    let stored_report = format!("/uploads/projects/:id/{REPORT_FILE_NAME}");

    let protected = Router::new()
        // Auth
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::me))
        .route(
            "/api/auth/reset-password",
            post(handlers::auth::reset_password),
        )
        .route("/api/auth/verify-token", post(handlers::auth::verify_token))
        // Interns
        .route(
            "/api/interns",
            get(handlers::interns::list).post(handlers::interns::create),
        )
        .route(
            "/api/interns/:id",
            get(handlers::interns::get)
                .put(handlers::interns::update)
                .delete(handlers::interns::delete),
        )
        .route(
            "/api/interns/:id/complete",
            post(handlers::interns::complete),
        )
        .route(
            "/api/interns/:id/documents",
            get(handlers::interns::documents),
        )
        // Applications
        .route(
            "/api/applications",
            get(handlers::applications::list).post(handlers::applications::submit),
        )
        .route(
            "/api/applications/events",
            get(handlers::applications::events),
        )
        .route(
            "/api/applications/status/pending",
            get(handlers::applications::pending),
        )
        .route(
            "/api/applications/intern/:intern_id",
            get(handlers::applications::for_intern),
        )
        .route(
            "/api/applications/:id",
            get(handlers::applications::get).put(handlers::applications::review),
        )
        // Mentors
        .route(
            "/api/mentors",
            get(handlers::mentors::list).post(handlers::mentors::create),
        )
        .route(
            "/api/mentors/available/:department",
            get(handlers::mentors::available),
        )
        .route("/api/mentors/assign", post(handlers::mentors::assign))
        .route(
            "/api/mentors/unassign/:intern_id",
            post(handlers::mentors::unassign),
        )
        .route(
            "/api/mentors/:id",
            put(handlers::mentors::update).delete(handlers::mentors::delete),
        )
        .route(
            "/api/mentors/:id/interns",
            get(handlers::mentors::interns),
        )
        // Tasks
        .route(
            "/api/tasks",
            get(handlers::tasks::list).post(handlers::tasks::create),
        )
        .route(
            "/api/tasks/:id",
            get(handlers::tasks::get)
                .put(handlers::tasks::update)
                .delete(handlers::tasks::delete),
        )
        // Projects
        .route(
            "/api/projects",
            get(handlers::projects::list).post(handlers::projects::submit),
        )
        .route("/api/projects/:id", get(handlers::projects::get))
        .route(
            "/api/projects/:id/review",
            put(handlers::projects::review),
        )
        .route(
            "/api/projects/:id/upload",
            post(handlers::projects::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/projects/:id/report", get(handlers::projects::report))
        .route(&stored_report, get(handlers::projects::report))
        // Feedback
        .route(
            "/api/feedback",
            get(handlers::feedback::list).post(handlers::feedback::create),
        )
        .route(
            "/api/feedback/:id",
            get(handlers::feedback::get)
                .put(handlers::feedback::update)
                .delete(handlers::feedback::delete),
        )
        // Meetings
        .route(
            "/api/meetings",
            get(handlers::meetings::list).post(handlers::meetings::schedule),
        )
        .route(
            "/api/meetings/:id",
            get(handlers::meetings::get)
                .put(handlers::meetings::update)
                .delete(handlers::meetings::delete),
        )
        // Certificates
        .route(
            "/api/certificates/internship/:application_id",
            post(handlers::certificates::internship),
        )
        .route(
            "/api/certificates/project/:project_id",
            post(handlers::certificates::project),
        )
        .route(
            "/api/certificates/intern/:intern_code",
            post(handlers::certificates::for_intern),
        )
        .route(
            "/api/certificates/:certificate_no",
            get(handlers::certificates::get),
        )
        .route(
            "/api/certificates/:certificate_no/pdf",
            get(handlers::certificates::pdf),
        )
        .layer(axum_mw::from_fn(require_auth));

    // Public routes (no auth)
    let public = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/auth/login", post(handlers::auth::login));

    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.clone())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    public
        .merge(protected)
        .layer(cors)
        .layer(axum_mw::from_fn(log_request))
        .layer(Extension(state))
}
