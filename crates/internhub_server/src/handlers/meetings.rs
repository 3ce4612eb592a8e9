//! GET|POST /api/meetings, GET|PUT|DELETE /api/meetings/:id

use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::response::{created, message, ok, ok_with, paged, ApiResult};
use crate::state::AppState;
use axum::Extension;
use internhub_core::model::intern::InternId;
use internhub_core::model::meeting::{Meeting, MeetingId, MeetingPatch, MeetingStatus, NewMeeting};
use internhub_core::model::mentor::MentorId;
use internhub_core::model::WithParties;
use internhub_core::repo::meeting_repo::MeetingListQuery;
use internhub_core::{Caller, MeetingService, PageRequest};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingListParams {
    pub intern_id: Option<InternId>,
    pub mentor_id: Option<MentorId>,
    pub status: Option<MeetingStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn list(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(params): ApiQuery<MeetingListParams>,
) -> ApiResult<Vec<WithParties<Meeting>>> {
    let query = MeetingListQuery {
        intern_id: params.intern_id,
        mentor_id: params.mentor_id,
        status: params.status,
    };
    let page = PageRequest::new(params.page, params.limit);
    let meetings = state
        .run(move |conn, _| MeetingService::new(conn).list(&caller, &query, page))
        .await?;
    paged(meetings)
}

pub async fn schedule(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(body): ApiJson<NewMeeting>,
) -> ApiResult<WithParties<Meeting>> {
    let meeting = state
        .run(move |conn, _| MeetingService::new(conn).schedule(&caller, body))
        .await?;
    created(meeting, "Meeting scheduled successfully")
}

pub async fn get(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<MeetingId>,
) -> ApiResult<WithParties<Meeting>> {
    let meeting = state
        .run(move |conn, _| MeetingService::new(conn).get(&caller, id))
        .await?;
    ok(meeting)
}

pub async fn update(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<MeetingId>,
    ApiJson(body): ApiJson<MeetingPatch>,
) -> ApiResult<WithParties<Meeting>> {
    let meeting = state
        .run(move |conn, _| MeetingService::new(conn).update(&caller, id, body))
        .await?;
    ok_with(meeting, "Meeting updated successfully")
}

pub async fn delete(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<MeetingId>,
) -> ApiResult<()> {
    state
        .run(move |conn, _| MeetingService::new(conn).delete(&caller, id))
        .await?;
    message("Meeting deleted successfully")
}
