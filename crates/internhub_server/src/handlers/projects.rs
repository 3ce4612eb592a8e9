//! GET|POST /api/projects, GET /api/projects/:id,
//! PUT /api/projects/:id/review, POST /api/projects/:id/upload,
//! GET /api/projects/:id/report (also mounted at the stored `fileUrl`)

use crate::error::AppError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::response::{created, ok, ok_with, paged, ApiResult};
use crate::state::AppState;
use axum::body::Body;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Extension;
use internhub_core::model::intern::InternId;
use internhub_core::model::mentor::MentorId;
use internhub_core::model::project::{
    NewProject, Project, ProjectId, ProjectReview, ProjectStatus, REPORT_FILE_NAME,
};
use internhub_core::model::WithParties;
use internhub_core::repo::project_repo::ProjectListQuery;
use internhub_core::service::project_service::ReportStore;
use internhub_core::{Caller, PageRequest, ProjectService};
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tower::ServiceExt;
use tower_http::services::ServeFile;

const REPORT_FIELDS: [&str; 2] = ["report", "file"];
const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListParams {
    pub intern_id: Option<InternId>,
    pub mentor_id: Option<MentorId>,
    pub status: Option<ProjectStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn list(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(params): ApiQuery<ProjectListParams>,
) -> ApiResult<Vec<WithParties<Project>>> {
    let query = ProjectListQuery {
        intern_id: params.intern_id,
        mentor_id: params.mentor_id,
        status: params.status,
    };
    let page = PageRequest::new(params.page, params.limit);
    let projects = state
        .run(move |conn, _| ProjectService::new(conn).list(&caller, &query, page))
        .await?;
    paged(projects)
}

pub async fn submit(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(body): ApiJson<NewProject>,
) -> ApiResult<WithParties<Project>> {
    let project = state
        .run(move |conn, _| ProjectService::new(conn).submit(&caller, body))
        .await?;
    created(project, "Project submitted successfully")
}

pub async fn get(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<ProjectId>,
) -> ApiResult<WithParties<Project>> {
    let project = state
        .run(move |conn, _| ProjectService::new(conn).get(&caller, id))
        .await?;
    ok(project)
}

pub async fn review(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<ProjectId>,
    ApiJson(body): ApiJson<ProjectReview>,
) -> ApiResult<WithParties<Project>> {
    let project = state
        .run(move |conn, _| ProjectService::new(conn).review(&caller, id, body))
        .await?;
    ok_with(project, "Project reviewed successfully")
}

/// Accepts one PDF in a `report` (or `file`) multipart field.
pub async fn upload(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<ProjectId>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<WithParties<Project>> {
    let store = DiskReport {
        upload_dir: state.config().upload_dir.clone(),
        bytes: read_report(multipart?, state.config().max_file_size).await?,
    };
    let project = state
        .run(move |conn, _| ProjectService::new(conn).attach_report(&caller, id, &store))
        .await?;
    ok_with(project, "Project report uploaded successfully")
}

/// Streams the stored report to callers who may read the project.
pub async fn report(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<ProjectId>,
    request: Request,
) -> Result<Response, AppError> {
    let project = state
        .run(move |conn, _| ProjectService::new(conn).get(&caller, id))
        .await?;
    if project.record.file_url.is_none() {
        return Err(AppError::new(StatusCode::NOT_FOUND, "No report uploaded"));
    }

    let path = report_path(&state.config().upload_dir, id);
    let response = ServeFile::new(path)
        .oneshot(request)
        .await
        .map_err(|never| -> AppError { match never {} })?;
    if response.status() == StatusCode::NOT_FOUND {
        return Err(AppError::new(StatusCode::NOT_FOUND, "Report file is missing"));
    }
    Ok(response.map(Body::new))
}

async fn read_report(mut multipart: Multipart, max_size: usize) -> Result<Vec<u8>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        let is_report = field
            .name()
            .is_some_and(|name| REPORT_FIELDS.contains(&name));
        if !is_report {
            continue;
        }
        if let Some(content_type) = field.content_type() {
            if content_type != PDF_MIME {
                debug!("event=report_upload module=server status=rejected reason=content_type");
                return Err(AppError::bad_request("Only PDF files are allowed"));
            }
        }
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(AppError::bad_request("Uploaded file is empty"));
        }
        if bytes.len() > max_size {
            return Err(AppError::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("File exceeds the {max_size} byte limit"),
            ));
        }
        return Ok(bytes.to_vec());
    }
    Err(AppError::bad_request("No file uploaded"))
}

fn report_path(upload_dir: &Path, project_id: ProjectId) -> PathBuf {
    upload_dir
        .join("projects")
        .join(project_id.to_string())
        .join(REPORT_FILE_NAME)
}

/// One uploaded report waiting to be written under the upload directory.
struct DiskReport {
    upload_dir: PathBuf,
    bytes: Vec<u8>,
}

impl ReportStore for DiskReport {
    /// Writes to a sibling `.part` file and renames it into place.
    fn store(&self, id: ProjectId) -> std::io::Result<()> {
        let target = report_path(&self.upload_dir, id);
        if let Some(dir) = target.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let staging = target.with_extension("pdf.part");
        std::fs::write(&staging, &self.bytes)?;
        std::fs::rename(&staging, &target).inspect_err(|_| {
            let _ = std::fs::remove_file(&staging);
        })
    }

    fn discard(&self, id: ProjectId) -> std::io::Result<()> {
        match std::fs::remove_file(report_path(&self.upload_dir, id)) {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}
