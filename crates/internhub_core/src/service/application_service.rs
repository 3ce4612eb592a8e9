//! Application submission and review.
//!
//! A review decision cascades to the intern in the same transaction:
//! `APPROVED` -> intern `APPROVED`, `REJECTED` -> intern `REJECTED`.

use super::access::{self, Caller};
use super::{ServiceError, ServiceResult};
use crate::model::application::{Application, ApplicationId, ApplicationReview};
use crate::model::intern::InternId;
use crate::model::user::Role;
use crate::repo::application_repo::{
    ApplicationListQuery, ApplicationRecord, ApplicationRepository, SqliteApplicationRepository,
};
use crate::repo::intern_repo::{InternRepository, SqliteInternRepository};
use log::info;
use rusqlite::Connection;

pub struct ApplicationService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> ApplicationService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn read_back(&self, id: ApplicationId) -> ServiceResult<ApplicationRecord> {
        SqliteApplicationRepository::new(self.conn)
            .get_application(id)?
            .ok_or_else(|| ServiceError::Internal("application not found in read-back".to_string()))
    }

    /// Files an application for an intern that has none yet.
    pub fn submit(&self, caller: &Caller, intern_id: InternId) -> ServiceResult<ApplicationRecord> {
        caller.require_any(&[Role::Admin, Role::Employee])?;
        let intern = SqliteInternRepository::new(self.conn)
            .get_intern(intern_id)?
            .ok_or_else(|| ServiceError::not_found("Intern"))?;
        let scope = access::resolve_scope(self.conn, caller)?;
        access::ensure_intern_visible(self.conn, &scope, &intern)?;

        let applications = SqliteApplicationRepository::new(self.conn);
        if applications.exists_for_intern(intern_id)? {
            return Err(ServiceError::Conflict(
                "Application already exists for this intern".to_string(),
            ));
        }
        let application = Application::submitted(intern_id);
        applications.create_application(&application)?;
        self.read_back(application.id)
    }

    pub fn list(
        &self,
        caller: &Caller,
        query: &ApplicationListQuery,
    ) -> ServiceResult<Vec<ApplicationRecord>> {
        let scope = access::resolve_scope(self.conn, caller)?;
        Ok(SqliteApplicationRepository::new(self.conn).list_applications(query, &scope)?)
    }

    pub fn get(&self, caller: &Caller, id: ApplicationId) -> ServiceResult<ApplicationRecord> {
        let record = SqliteApplicationRepository::new(self.conn)
            .get_application(id)?
            .ok_or_else(|| ServiceError::not_found("Application"))?;
        self.ensure_visible(caller, record.application.intern_id)?;
        Ok(record)
    }

    /// Records a review decision and cascades it to the intern.
    pub fn review(
        &self,
        caller: &Caller,
        id: ApplicationId,
        review: ApplicationReview,
    ) -> ServiceResult<ApplicationRecord> {
        caller.require_any(&[Role::Admin])?;
        let review = review.normalized();
        review.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        let applications = SqliteApplicationRepository::new(&tx);
        let current = applications
            .get_application(id)?
            .ok_or_else(|| ServiceError::not_found("Application"))?;
        if current.application.status.is_decided() {
            return Err(ServiceError::invalid_state(format!(
                "Application has already been {}",
                current.application.status
            )));
        }

        applications.record_review(id, review.status, caller.user_id, review.review_notes.as_deref())?;
        if let Some(intern_status) = review.status.cascaded_intern_status() {
            SqliteInternRepository::new(&tx).set_status(current.application.intern_id, intern_status)?;
        }
        tx.commit()?;

        info!(
            "event=application_review module=service status=ok decision={}",
            review.status
        );
        self.read_back(id)
    }

    /// `SUBMITTED` applications awaiting review, oldest first.
    pub fn pending(&self, caller: &Caller) -> ServiceResult<Vec<ApplicationRecord>> {
        caller.require_any(&[Role::Admin])?;
        Ok(SqliteApplicationRepository::new(self.conn).list_pending()?)
    }

    /// Latest application of one intern.
    pub fn for_intern(&self, caller: &Caller, intern_id: InternId) -> ServiceResult<ApplicationRecord> {
        self.ensure_visible(caller, intern_id)?;
        SqliteApplicationRepository::new(self.conn)
            .latest_for_intern(intern_id)?
            .ok_or_else(|| ServiceError::not_found("Application"))
    }

    fn ensure_visible(&self, caller: &Caller, intern_id: InternId) -> ServiceResult<()> {
        let intern = SqliteInternRepository::new(self.conn)
            .get_intern(intern_id)?
            .ok_or_else(|| ServiceError::not_found("Intern"))?;
        let scope = access::resolve_scope(self.conn, caller)?;
        access::ensure_intern_visible(self.conn, &scope, &intern)
    }
}
