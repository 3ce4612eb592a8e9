//! InternHub HTTP server.
//!
//! Thin axum layer over `internhub_core`: handlers extract input, run one
//! service call on the blocking pool and wrap the result in the JSON envelope.

pub mod config;
pub mod error;
pub mod events;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::AppError;
pub use router::build_router;
pub use state::AppState;
