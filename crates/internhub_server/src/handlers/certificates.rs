//! POST /api/certificates/internship/:application_id,
//! POST /api/certificates/project/:project_id,
//! POST /api/certificates/intern/:intern_code, GET /api/certificates/:certificate_no,
//! GET /api/certificates/:certificate_no/pdf

use crate::error::AppError;
use crate::extract::ApiPath;
use crate::response::{created, ok, ApiResult};
use crate::state::AppState;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use internhub_core::model::application::ApplicationId;
use internhub_core::model::certificate::CertificateDocument;
use internhub_core::model::project::ProjectId;
use internhub_core::{Caller, CertificateService};

pub async fn internship(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(application_id): ApiPath<ApplicationId>,
) -> ApiResult<CertificateDocument> {
    let document = state
        .run(move |conn, _| CertificateService::new(conn).issue_internship(&caller, application_id))
        .await?;
    created(document, "Certificate generated successfully")
}

pub async fn project(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(project_id): ApiPath<ProjectId>,
) -> ApiResult<CertificateDocument> {
    let document = state
        .run(move |conn, _| CertificateService::new(conn).issue_project(&caller, project_id))
        .await?;
    created(document, "Certificate generated successfully")
}

pub async fn for_intern(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(intern_code): ApiPath<String>,
) -> ApiResult<CertificateDocument> {
    let document = state
        .run(move |conn, _| CertificateService::new(conn).issue_for_intern(&caller, &intern_code))
        .await?;
    created(document, "Certificate generated successfully")
}

pub async fn get(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(certificate_no): ApiPath<String>,
) -> ApiResult<CertificateDocument> {
    let document = state
        .run(move |conn, _| CertificateService::new(conn).get(&caller, &certificate_no))
        .await?;
    ok(document)
}

pub async fn pdf(
    Extension(state): Extension<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(certificate_no): ApiPath<String>,
) -> Result<Response, AppError> {
    let number = certificate_no.trim().to_string();
    let bytes = state
        .run(move |conn, _| CertificateService::new(conn).pdf(&caller, &certificate_no))
        .await?;
    let disposition = format!("inline; filename=\"certificate-{number}.pdf\"");
    Ok((
        [(CONTENT_TYPE, "application/pdf".to_string()), (CONTENT_DISPOSITION, disposition)],
        bytes,
    )
        .into_response())
}
