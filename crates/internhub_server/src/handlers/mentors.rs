//! GET|POST /api/mentors, PUT|DELETE /api/mentors/:id,
//! GET /api/mentors/available/:department, POST /api/mentors/assign,
//! POST /api/mentors/unassign/:intern_id, GET /api/mentors/:id/interns

use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::response::{created, message, ok, ok_with, ApiResult};
use crate::state::AppState;
use axum::Extension;
use internhub_core::model::assignment::NewAssignment;
use internhub_core::model::intern::InternId;
use internhub_core::model::mentor::{
    Mentor, MentorAvailability, MentorId, MentorOverview, MentorPatch, NewMentor,
};
use internhub_core::service::mentor_service::{AssignmentResult, MentoredIntern};
use internhub_core::{Caller, MentorService};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct MentorListParams {
    pub department: Option<String>,
    pub availability: Option<MentorAvailability>,
}

pub async fn list(
    Extension(state): Extension<AppState>,
    ApiQuery(params): ApiQuery<MentorListParams>,
) -> ApiResult<Vec<MentorOverview>> {
    let mentors = state
        .run(move |conn, _| {
            MentorService::new(conn).list(params.department.as_deref(), params.availability)
        })
        .await?;
    ok(mentors)
}

pub async fn available(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(department): ApiPath<String>,
) -> ApiResult<Vec<Mentor>> {
    let mentors = state
        .run(move |conn, _| MentorService::new(conn).available(&caller, &department))
        .await?;
    ok(mentors)
}

pub async fn create(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(body): ApiJson<NewMentor>,
) -> ApiResult<Mentor> {
    let mentor = state
        .run(move |conn, _| MentorService::new(conn).create(&caller, body))
        .await?;
    created(mentor, "Mentor created successfully")
}

pub async fn update(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<MentorId>,
    ApiJson(body): ApiJson<MentorPatch>,
) -> ApiResult<Mentor> {
    let mentor = state
        .run(move |conn, _| MentorService::new(conn).update(&caller, id, body))
        .await?;
    ok_with(mentor, "Mentor updated successfully")
}

pub async fn delete(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<MentorId>,
) -> ApiResult<()> {
    state
        .run(move |conn, _| MentorService::new(conn).delete(&caller, id))
        .await?;
    message("Mentor deleted successfully")
}

pub async fn assign(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(body): ApiJson<NewAssignment>,
) -> ApiResult<AssignmentResult> {
    let result = state
        .run(move |conn, _| MentorService::new(conn).assign(&caller, body))
        .await?;
    created(result, "Mentor assigned successfully")
}

pub async fn unassign(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(intern_id): ApiPath<InternId>,
) -> ApiResult<()> {
    state
        .run(move |conn, _| MentorService::new(conn).unassign(&caller, intern_id))
        .await?;
    message("Mentor unassigned successfully")
}

pub async fn interns(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<MentorId>,
) -> ApiResult<Vec<MentoredIntern>> {
    let interns = state
        .run(move |conn, _| MentorService::new(conn).interns_of(&caller, id))
        .await?;
    ok(interns)
}
