//! Shared handler state.
//!
//! # Invariants
//! - The SQLite connection is only touched on the blocking pool, one call at
//!   a time.

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::events::StatusFeed;
use internhub_core::{ServiceResult, TokenKeys};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    keys: Arc<TokenKeys>,
    config: Arc<ServerConfig>,
    status_feed: StatusFeed,
}

impl AppState {
    pub fn new(conn: Connection, keys: TokenKeys, config: ServerConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            keys: Arc::new(keys),
            config: Arc::new(config),
            status_feed: StatusFeed::default(),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn status_feed(&self) -> &StatusFeed {
        &self.status_feed
    }

    /// Runs a core call against the connection on the blocking pool.
    pub async fn run<T, F>(&self, work: F) -> Result<T, AppError>
    where
        F: FnOnce(&Connection, &TokenKeys) -> ServiceResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let keys = Arc::clone(&self.keys);
        tokio::task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|_| AppError::internal("database mutex poisoned"))?;
            work(&conn, &keys).map_err(AppError::from)
        })
        .await
        .map_err(|err| AppError::internal(format!("blocking task failed: {err}")))?
    }
}
