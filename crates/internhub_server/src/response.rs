//! Success envelope: `{ "success": true, "data": ..., "message"?, "pagination"? }`.

use crate::error::AppError;
use axum::http::StatusCode;
use axum::Json;
use internhub_core::{Page, Pagination};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination: Option<Pagination>,
}

pub type ApiResult<T> = Result<(StatusCode, Json<Envelope<T>>), AppError>;

fn respond<T>(
    status: StatusCode,
    data: Option<T>,
    message: Option<&'static str>,
    pagination: Option<Pagination>,
) -> ApiResult<T> {
    Ok((
        status,
        Json(Envelope {
            success: true,
            data,
            message,
            pagination,
        }),
    ))
}

pub fn ok<T>(data: T) -> ApiResult<T> {
    respond(StatusCode::OK, Some(data), None, None)
}

pub fn ok_with<T>(data: T, message: &'static str) -> ApiResult<T> {
    respond(StatusCode::OK, Some(data), Some(message), None)
}

pub fn created<T>(data: T, message: &'static str) -> ApiResult<T> {
    respond(StatusCode::CREATED, Some(data), Some(message), None)
}

pub fn message(message: &'static str) -> ApiResult<()> {
    respond(StatusCode::OK, None, Some(message), None)
}

pub fn paged<T>(page: Page<T>) -> ApiResult<Vec<T>> {
    respond(StatusCode::OK, Some(page.items), None, Some(page.pagination))
}
