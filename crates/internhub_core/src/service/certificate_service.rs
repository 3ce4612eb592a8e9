//! Certificate issuance and lookup.
//!
//! # Invariants
//! - Issuance is idempotent per (kind, intern, project).
//! - Certificates are only issued for approved work.

use super::access::{self, Caller};
use super::{now_millis, ServiceError, ServiceResult};
use crate::model::application::{ApplicationId, ApplicationStatus};
use crate::model::certificate::{
    certificate_number, Certificate, CertificateDocument, CertificateKind,
};
use crate::model::intern::{Intern, InternId, InternStatus};
use crate::model::project::{Project, ProjectId, ProjectStatus};
use crate::model::user::Role;
use crate::repo::application_repo::{ApplicationRepository, SqliteApplicationRepository};
use crate::repo::assignment_repo::{AssignmentRepository, SqliteAssignmentRepository};
use crate::repo::certificate_repo::{CertificateRepository, SqliteCertificateRepository};
use crate::repo::intern_repo::{InternRepository, SqliteInternRepository};
use crate::repo::mentor_repo::{MentorRepository, SqliteMentorRepository};
use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use log::info;
use rusqlite::Connection;
use uuid::Uuid;

const MAX_NUMBER_ATTEMPTS: i64 = 1_000;

pub struct CertificateService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> CertificateService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Internship completion certificate for an approved application.
    pub fn issue_internship(
        &self,
        caller: &Caller,
        application_id: ApplicationId,
    ) -> ServiceResult<CertificateDocument> {
        caller.require_any(&[Role::Admin])?;
        let application = SqliteApplicationRepository::new(self.conn)
            .get_application(application_id)?
            .ok_or_else(|| ServiceError::not_found("Application"))?
            .application;
        if application.status != ApplicationStatus::Approved {
            return Err(ServiceError::invalid_state(
                "Certificate can only be issued for an APPROVED application",
            ));
        }
        let intern = self.intern(application.intern_id)?;
        if !matches!(intern.status, InternStatus::Active | InternStatus::Completed) {
            return Err(ServiceError::invalid_state(format!(
                "Intern must be ACTIVE or COMPLETED (current status: {})",
                intern.status
            )));
        }

        let certificate = self.issue_once(
            caller,
            CertificateKind::Internship,
            &intern,
            Some(application.id),
            None,
        )?;
        self.document(certificate, intern, None)
    }

    /// Project completion certificate; ADMIN or the project's mentor.
    pub fn issue_project(
        &self,
        caller: &Caller,
        project_id: ProjectId,
    ) -> ServiceResult<CertificateDocument> {
        caller.require_any(&[Role::Admin, Role::Mentor])?;
        let project = SqliteProjectRepository::new(self.conn)
            .get_project(project_id)?
            .ok_or_else(|| ServiceError::not_found("Project"))?
            .record;
        access::ensure_owning_mentor(self.conn, caller, project.mentor_id)?;
        if project.status != ProjectStatus::Approved {
            return Err(ServiceError::invalid_state(
                "Certificate can only be issued for an APPROVED project",
            ));
        }
        self.issue_for_project(caller, project)
    }

    /// Project certificate for an intern's latest approved project.
    pub fn issue_for_intern(
        &self,
        caller: &Caller,
        intern_code: &str,
    ) -> ServiceResult<CertificateDocument> {
        let intern = SqliteInternRepository::new(self.conn)
            .find_by_code(intern_code.trim())?
            .ok_or_else(|| ServiceError::not_found("Intern"))?;
        match caller.role {
            Role::Admin | Role::Mentor | Role::Intern => {
                let scope = access::resolve_scope(self.conn, caller)?;
                access::ensure_intern_visible(self.conn, &scope, &intern)?;
            }
            Role::Employee => return Err(ServiceError::insufficient_permissions()),
        }

        let project = SqliteProjectRepository::new(self.conn)
            .latest_approved(intern.id)?
            .ok_or_else(|| {
                ServiceError::NotFound("No approved project found for this intern".to_string())
            })?
            .record;
        self.issue_for_project(caller, project)
    }

    pub fn get(&self, caller: &Caller, certificate_no: &str) -> ServiceResult<CertificateDocument> {
        let certificate = SqliteCertificateRepository::new(self.conn)
            .get_by_number(certificate_no.trim())?
            .ok_or_else(|| ServiceError::not_found("Certificate"))?;
        let intern = self.intern(certificate.intern_id)?;
        let scope = access::resolve_scope(self.conn, caller)?;
        access::ensure_intern_visible(self.conn, &scope, &intern)?;

        let project = match certificate.project_id {
            Some(project_id) => SqliteProjectRepository::new(self.conn)
                .get_project(project_id)?
                .map(|project| project.record),
            None => None,
        };
        self.document(certificate, intern, project)
    }

    /// PDF rendering of a certificate the caller may read.
    pub fn pdf(&self, caller: &Caller, certificate_no: &str) -> ServiceResult<Vec<u8>> {
        let document = self.get(caller, certificate_no)?;
        let bytes = document.to_pdf().map_err(|err| {
            ServiceError::Internal(format!("certificate pdf rendering failed: {err}"))
        })?;
        info!("event=certificate_pdf module=service status=ok bytes={}", bytes.len());
        Ok(bytes)
    }

    fn issue_for_project(
        &self,
        caller: &Caller,
        project: Project,
    ) -> ServiceResult<CertificateDocument> {
        let intern = self.intern(project.intern_id)?;
        let certificate = self.issue_once(
            caller,
            CertificateKind::Project,
            &intern,
            None,
            Some(project.id),
        )?;
        self.document(certificate, intern, Some(project))
    }

    fn intern(&self, id: InternId) -> ServiceResult<Intern> {
        SqliteInternRepository::new(self.conn)
            .get_intern(id)?
            .ok_or_else(|| ServiceError::not_found("Intern"))
    }

    /// Returns the stored certificate for the subject or issues a new one.
    fn issue_once(
        &self,
        caller: &Caller,
        kind: CertificateKind,
        intern: &Intern,
        application_id: Option<ApplicationId>,
        project_id: Option<ProjectId>,
    ) -> ServiceResult<Certificate> {
        let certificates = SqliteCertificateRepository::new(self.conn);
        if let Some(existing) = certificates.find_subject(kind, intern.id, project_id)? {
            return Ok(existing);
        }

        let issued_at = now_millis();
        let certificate = Certificate {
            id: Uuid::new_v4(),
            certificate_no: next_certificate_number(&certificates, kind, issued_at)?,
            kind,
            intern_id: intern.id,
            application_id,
            project_id,
            issued_by: caller.user_id,
            issued_at,
        };
        certificates.create_certificate(&certificate)?;
        info!(
            "event=certificate_issue module=service status=ok kind={} certificate_no={}",
            kind, certificate.certificate_no
        );
        Ok(certificate)
    }

    fn document(
        &self,
        certificate: Certificate,
        intern: Intern,
        project: Option<Project>,
    ) -> ServiceResult<CertificateDocument> {
        let mentor_id = match &project {
            Some(project) => Some(project.mentor_id),
            None => SqliteAssignmentRepository::new(self.conn)
                .active_for_intern(intern.id)?
                .map(|assignment| assignment.mentor_id),
        };
        let mentor_name = match mentor_id {
            Some(mentor_id) => SqliteMentorRepository::new(self.conn)
                .get_mentor(mentor_id)?
                .map(|mentor| mentor.name),
            None => None,
        };

        Ok(CertificateDocument {
            certificate,
            intern_name: intern.name,
            intern_code: intern.intern_code,
            institute: intern.institute,
            department: intern.department,
            start_date: intern.start_date,
            end_date: intern.end_date,
            mentor_name,
            project_title: project.as_ref().map(|project| project.title.clone()),
            grade: project.and_then(|project| project.grade),
            rendered_text: String::new(),
        }
        .rendered())
    }
}

fn next_certificate_number(
    certificates: &impl CertificateRepository,
    kind: CertificateKind,
    issued_at: i64,
) -> ServiceResult<String> {
    for attempt in 0..MAX_NUMBER_ATTEMPTS {
        let number = certificate_number(kind, issued_at + attempt);
        if !certificates.number_exists(&number)? {
            return Ok(number);
        }
    }
    Err(ServiceError::Internal(
        "could not allocate a unique certificate number".to_string(),
    ))
}
