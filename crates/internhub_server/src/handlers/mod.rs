//! Route handlers, one module per resource.
//!
//! Every handler moves its inputs into a blocking closure that builds the
//! core service on the shared connection; see [`crate::state::AppState::run`].

pub mod applications;
pub mod auth;
pub mod certificates;
pub mod feedback;
pub mod health;
pub mod interns;
pub mod meetings;
pub mod mentors;
pub mod projects;
pub mod tasks;
