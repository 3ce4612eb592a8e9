//! InternHub server entry point.
//!
//! Reads configuration from the environment (and `.env`), opens the SQLite
//! database, applies migrations and serves the REST API.

use anyhow::{Context, Result};
use internhub_core::{init_logging, open_db, TokenKeys};
use internhub_server::{build_router, AppState, ServerConfig};
use log::{error, info};
use std::process::ExitCode;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("internhub_server: invalid configuration: {err}");
            return ExitCode::from(2);
        }
    };
    if let Err(err) = init_logging(&config.log_level, config.log_dir.as_deref()) {
        eprintln!("internhub_server: logging disabled: {err}");
    }

    match serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=server_exit module=server status=error detail={err:#}");
            eprintln!("internhub_server: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: ServerConfig) -> Result<()> {
    let conn = open_db(&config.database_path).with_context(|| {
        format!("opening database {}", config.database_path.display())
    })?;
    let keys = TokenKeys::from_secret(config.jwt_secret.as_bytes(), config.jwt_ttl_secs)
        .context("preparing token keys")?;
    let addr = config.bind_addr();

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("event=server_start module=server status=ok addr={addr}");

    let app = build_router(AppState::new(conn, keys, config));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving requests")?;
    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
