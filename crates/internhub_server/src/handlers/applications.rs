//! GET|POST /api/applications, GET|PUT /api/applications/:id,
//! GET /api/applications/status/pending, GET /api/applications/intern/:intern_id,
//! GET /api/applications/events (server-sent status updates)

use crate::events::StatusUpdate;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::response::{created, ok, ok_with, ApiResult};
use crate::state::AppState;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Extension;
use futures::{Stream, StreamExt};
use internhub_core::model::application::{ApplicationId, ApplicationReview, ApplicationStatus};
use internhub_core::model::intern::InternId;
use internhub_core::repo::application_repo::{ApplicationListQuery, ApplicationRecord};
use internhub_core::{ApplicationService, Caller};
use serde::Deserialize;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;

const KEEP_ALIVE_EVERY: Duration = Duration::from_secs(15);

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationListParams {
    pub status: Option<ApplicationStatus>,
    pub department: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplicationRequest {
    pub intern_id: InternId,
}

pub async fn list(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(params): ApiQuery<ApplicationListParams>,
) -> ApiResult<Vec<ApplicationRecord>> {
    let query = ApplicationListQuery {
        status: params.status,
        department: params.department,
    };
    let records = state
        .run(move |conn, _| ApplicationService::new(conn).list(&caller, &query))
        .await?;
    ok(records)
}

pub async fn submit(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(body): ApiJson<SubmitApplicationRequest>,
) -> ApiResult<ApplicationRecord> {
    let record = state
        .run(move |conn, _| ApplicationService::new(conn).submit(&caller, body.intern_id))
        .await?;
    state.status_feed().publish(StatusUpdate::from_record(&record));
    created(record, "Application submitted successfully")
}

pub async fn get(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<ApplicationId>,
) -> ApiResult<ApplicationRecord> {
    let record = state
        .run(move |conn, _| ApplicationService::new(conn).get(&caller, id))
        .await?;
    ok(record)
}

pub async fn review(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<ApplicationId>,
    ApiJson(body): ApiJson<ApplicationReview>,
) -> ApiResult<ApplicationRecord> {
    let record = state
        .run(move |conn, _| ApplicationService::new(conn).review(&caller, id, body))
        .await?;
    state.status_feed().publish(StatusUpdate::from_record(&record));
    ok_with(record, "Application reviewed successfully")
}

pub async fn pending(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Vec<ApplicationRecord>> {
    let records = state
        .run(move |conn, _| ApplicationService::new(conn).pending(&caller))
        .await?;
    ok(records)
}

pub async fn for_intern(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(intern_id): ApiPath<InternId>,
) -> ApiResult<ApplicationRecord> {
    let record = state
        .run(move |conn, _| ApplicationService::new(conn).for_intern(&caller, intern_id))
        .await?;
    ok(record)
}

/// Streams `application_status` events for applications the caller may read.
pub async fn events(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.status_feed().subscribe();
    let updates = BroadcastStream::new(receiver).filter_map(move |update| {
        let state = state.clone();
        let caller = caller.clone();
        async move {
            // Lagged receivers drop the missed updates.
            let update = update.ok()?;
            if !caller.is_admin() {
                let id = update.id;
                state
                    .run(move |conn, _| ApplicationService::new(conn).get(&caller, id))
                    .await
                    .ok()?;
            }
            let data = serde_json::to_string(&update).ok()?;
            Some(Ok(Event::default().event("application_status").data(data)))
        }
    });
    Sse::new(updates).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_EVERY).text("ping"))
}
