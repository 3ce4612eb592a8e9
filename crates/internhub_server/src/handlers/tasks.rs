//! GET|POST /api/tasks, GET|PUT|DELETE /api/tasks/:id

use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::response::{created, message, ok, ok_with, paged, ApiResult};
use crate::state::AppState;
use axum::Extension;
use internhub_core::model::intern::InternId;
use internhub_core::model::mentor::MentorId;
use internhub_core::model::task::{NewTask, Task, TaskId, TaskPatch, TaskStatus};
use internhub_core::model::WithParties;
use internhub_core::repo::task_repo::TaskListQuery;
use internhub_core::{Caller, PageRequest, TaskService};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListParams {
    pub intern_id: Option<InternId>,
    pub mentor_id: Option<MentorId>,
    pub status: Option<TaskStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn list(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(params): ApiQuery<TaskListParams>,
) -> ApiResult<Vec<WithParties<Task>>> {
    let query = TaskListQuery {
        intern_id: params.intern_id,
        mentor_id: params.mentor_id,
        status: params.status,
    };
    let page = PageRequest::new(params.page, params.limit);
    let tasks = state
        .run(move |conn, _| TaskService::new(conn).list(&caller, &query, page))
        .await?;
    paged(tasks)
}

pub async fn create(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(body): ApiJson<NewTask>,
) -> ApiResult<WithParties<Task>> {
    let task = state
        .run(move |conn, _| TaskService::new(conn).create(&caller, body))
        .await?;
    created(task, "Task created successfully")
}

pub async fn get(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<TaskId>,
) -> ApiResult<WithParties<Task>> {
    let task = state
        .run(move |conn, _| TaskService::new(conn).get(&caller, id))
        .await?;
    ok(task)
}

pub async fn update(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<TaskId>,
    ApiJson(body): ApiJson<TaskPatch>,
) -> ApiResult<WithParties<Task>> {
    let task = state
        .run(move |conn, _| TaskService::new(conn).update(&caller, id, body))
        .await?;
    ok_with(task, "Task updated successfully")
}

pub async fn delete(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<TaskId>,
) -> ApiResult<()> {
    state
        .run(move |conn, _| TaskService::new(conn).delete(&caller, id))
        .await?;
    message("Task deleted successfully")
}
