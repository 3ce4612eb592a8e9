//! Bearer-token authentication.
//!
//! Resolves `Authorization: Bearer <jwt>` to a [`Caller`] and stores it in the
//! request extensions for handlers.

use crate::error::AppError;
use crate::state::AppState;
use axum::extract::Request;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use axum::Extension;
use internhub_core::{AuthService, Caller};
use log::debug;

pub async fn require_auth(
    Extension(state): Extension<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)
        .ok_or_else(|| AppError::unauthorized("Access token required"))?
        .to_string();

    let caller: Caller = state
        .run(move |conn, keys| AuthService::new(conn, keys).authenticate(&token))
        .await
        .inspect_err(|_| debug!("event=auth_token module=server status=rejected"))?;

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<&str> {
    let value = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
