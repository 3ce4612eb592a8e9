//! GET|POST /api/feedback, GET|PUT|DELETE /api/feedback/:id

use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::response::{created, message, ok, ok_with, paged, ApiResult};
use crate::state::AppState;
use axum::Extension;
use internhub_core::model::feedback::{Feedback, FeedbackId, FeedbackPatch, NewFeedback};
use internhub_core::model::intern::InternId;
use internhub_core::model::mentor::MentorId;
use internhub_core::model::WithParties;
use internhub_core::repo::feedback_repo::FeedbackListQuery;
use internhub_core::{Caller, FeedbackService, PageRequest};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackListParams {
    pub intern_id: Option<InternId>,
    pub mentor_id: Option<MentorId>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn list(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(params): ApiQuery<FeedbackListParams>,
) -> ApiResult<Vec<WithParties<Feedback>>> {
    let query = FeedbackListQuery {
        intern_id: params.intern_id,
        mentor_id: params.mentor_id,
    };
    let page = PageRequest::new(params.page, params.limit);
    let feedback = state
        .run(move |conn, _| FeedbackService::new(conn).list(&caller, &query, page))
        .await?;
    paged(feedback)
}

pub async fn create(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(body): ApiJson<NewFeedback>,
) -> ApiResult<WithParties<Feedback>> {
    let feedback = state
        .run(move |conn, _| FeedbackService::new(conn).create(&caller, body))
        .await?;
    created(feedback, "Feedback submitted successfully")
}

pub async fn get(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<FeedbackId>,
) -> ApiResult<WithParties<Feedback>> {
    let feedback = state
        .run(move |conn, _| FeedbackService::new(conn).get(&caller, id))
        .await?;
    ok(feedback)
}

pub async fn update(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<FeedbackId>,
    ApiJson(body): ApiJson<FeedbackPatch>,
) -> ApiResult<WithParties<Feedback>> {
    let feedback = state
        .run(move |conn, _| FeedbackService::new(conn).update(&caller, id, body))
        .await?;
    ok_with(feedback, "Feedback updated successfully")
}

pub async fn delete(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<FeedbackId>,
) -> ApiResult<()> {
    state
        .run(move |conn, _| FeedbackService::new(conn).delete(&caller, id))
        .await?;
    message("Feedback deleted successfully")
}
