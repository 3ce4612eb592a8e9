//! POST /api/auth/login | /logout | /reset-password | /verify-token, GET /api/auth/me

use crate::extract::ApiJson;
use crate::response::{message, ok, ok_with, ApiResult};
use crate::state::AppState;
use axum::Extension;
use internhub_core::{AuthService, Caller, LoginResult, User};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn login(
    Extension(state): Extension<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<LoginResult> {
    let result = state
        .run(move |conn, keys| AuthService::new(conn, keys).login(&body.username, &body.password))
        .await?;
    ok_with(result, "Login successful")
}

pub async fn logout(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<()> {
    state
        .run(move |conn, keys| {
            AuthService::new(conn, keys).logout(&caller);
            Ok(())
        })
        .await?;
    message("Logout successful")
}

pub async fn me(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<User> {
    let user = state
        .run(move |conn, keys| AuthService::new(conn, keys).me(&caller))
        .await?;
    ok(user)
}

pub async fn reset_password(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(body): ApiJson<ResetPasswordRequest>,
) -> ApiResult<()> {
    state
        .run(move |conn, keys| {
            AuthService::new(conn, keys).reset_password(
                &caller,
                &body.current_password,
                &body.new_password,
            )
        })
        .await?;
    message("Password updated successfully")
}

pub async fn verify_token(Extension(caller): Extension<Caller>) -> ApiResult<Caller> {
    ok_with(caller, "Token is valid")
}
