//! GET /health

use crate::state::AppState;
use axum::{Extension, Json};
use internhub_core::db::ping;
use log::warn;
use serde_json::{json, Value};

/// GET /health: liveness plus a database round-trip.
pub async fn health(Extension(state): Extension<AppState>) -> Json<Value> {
    let database = match state.run(|conn, _| Ok(ping(conn).is_ok())).await {
        Ok(true) => "ok",
        _ => {
            warn!("event=health_check module=server status=degraded");
            "error"
        }
    };
    Json(json!({
        "status": "ok",
        "database": database,
        "version": internhub_core::core_version(),
    }))
}
