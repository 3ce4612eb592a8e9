//! GET|POST /api/interns, GET|PUT|DELETE /api/interns/:id,
//! POST /api/interns/:id/complete, GET /api/interns/:id/documents

use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::response::{created, message, ok, ok_with, paged, ApiResult};
use crate::state::AppState;
use axum::Extension;
use internhub_core::model::intern::{Intern, InternId, InternPatch, InternStatus, NewIntern};
use internhub_core::model::mentor::MentorId;
use internhub_core::repo::intern_repo::{InternListQuery, InternSummary};
use internhub_core::service::intern_service::{InternCreated, InternDetail, InternDocuments};
use internhub_core::{Caller, InternService, PageRequest};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternListParams {
    pub status: Option<InternStatus>,
    pub department: Option<String>,
    pub mentor_id: Option<MentorId>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn list(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(params): ApiQuery<InternListParams>,
) -> ApiResult<Vec<InternSummary>> {
    let query = InternListQuery {
        status: params.status,
        department: params.department,
        mentor_id: params.mentor_id,
        search: params.search,
    };
    let page = PageRequest::new(params.page, params.limit);
    let interns = state
        .run(move |conn, _| InternService::new(conn).list(&caller, query, page))
        .await?;
    paged(interns)
}

pub async fn create(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(body): ApiJson<NewIntern>,
) -> ApiResult<InternCreated> {
    let result = state
        .run(move |conn, _| InternService::new(conn).create(&caller, body))
        .await?;
    created(result, "Intern registered successfully")
}

pub async fn get(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<InternId>,
) -> ApiResult<InternDetail> {
    let detail = state
        .run(move |conn, _| InternService::new(conn).get(&caller, id))
        .await?;
    ok(detail)
}

pub async fn update(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<InternId>,
    ApiJson(body): ApiJson<InternPatch>,
) -> ApiResult<Intern> {
    let intern = state
        .run(move |conn, _| InternService::new(conn).update(&caller, id, body))
        .await?;
    ok_with(intern, "Intern updated successfully")
}

pub async fn delete(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<InternId>,
) -> ApiResult<()> {
    state
        .run(move |conn, _| InternService::new(conn).delete(&caller, id))
        .await?;
    message("Intern deleted successfully")
}

pub async fn complete(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<InternId>,
) -> ApiResult<Intern> {
    let intern = state
        .run(move |conn, _| InternService::new(conn).complete(&caller, id))
        .await?;
    ok_with(intern, "Internship marked as completed")
}

pub async fn documents(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<InternId>,
) -> ApiResult<InternDocuments> {
    let documents = state
        .run(move |conn, _| InternService::new(conn).documents(&caller, id))
        .await?;
    ok(documents)
}
