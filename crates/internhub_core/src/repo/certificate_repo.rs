//! Certificate repository contracts and SQLite implementation.

use super::{get_enum, get_optional_uuid, get_uuid, RepoResult};
use crate::model::certificate::{Certificate, CertificateId, CertificateKind};
use crate::model::intern::InternId;
use crate::model::project::ProjectId;
use rusqlite::{params, Connection, OptionalExtension, Row};

const CERTIFICATE_SELECT_SQL: &str = "SELECT
    id,
    certificate_no,
    kind,
    intern_id,
    application_id,
    project_id,
    issued_by,
    issued_at
FROM certificates";

pub trait CertificateRepository {
    fn create_certificate(&self, certificate: &Certificate) -> RepoResult<CertificateId>;
    /// Finds the certificate already issued for a subject, if any.
    fn find_subject(
        &self,
        kind: CertificateKind,
        intern_id: InternId,
        project_id: Option<ProjectId>,
    ) -> RepoResult<Option<Certificate>>;
    fn get_by_number(&self, certificate_no: &str) -> RepoResult<Option<Certificate>>;
    fn number_exists(&self, certificate_no: &str) -> RepoResult<bool>;
}

pub struct SqliteCertificateRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCertificateRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CertificateRepository for SqliteCertificateRepository<'_> {
    fn create_certificate(&self, certificate: &Certificate) -> RepoResult<CertificateId> {
        self.conn.execute(
            "INSERT INTO certificates (
                id,
                certificate_no,
                kind,
                intern_id,
                application_id,
                project_id,
                issued_by,
                issued_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                certificate.id.to_string(),
                certificate.certificate_no.as_str(),
                certificate.kind.as_str(),
                certificate.intern_id.to_string(),
                certificate.application_id.map(|id| id.to_string()),
                certificate.project_id.map(|id| id.to_string()),
                certificate.issued_by.to_string(),
                certificate.issued_at,
            ],
        )?;
        Ok(certificate.id)
    }

    fn find_subject(
        &self,
        kind: CertificateKind,
        intern_id: InternId,
        project_id: Option<ProjectId>,
    ) -> RepoResult<Option<Certificate>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CERTIFICATE_SELECT_SQL}
             WHERE kind = ?1
               AND intern_id = ?2
               AND IFNULL(project_id, '') = IFNULL(?3, '');"
        ))?;
        let row = stmt
            .query_row(
                params![
                    kind.as_str(),
                    intern_id.to_string(),
                    project_id.map(|id| id.to_string()),
                ],
                |row| Ok(parse_certificate_row(row)),
            )
            .optional()?;
        row.transpose()
    }

    fn get_by_number(&self, certificate_no: &str) -> RepoResult<Option<Certificate>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CERTIFICATE_SELECT_SQL} WHERE certificate_no = ?1;"))?;
        let row = stmt
            .query_row([certificate_no], |row| Ok(parse_certificate_row(row)))
            .optional()?;
        row.transpose()
    }

    fn number_exists(&self, certificate_no: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM certificates WHERE certificate_no = ?1);",
            [certificate_no],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

fn parse_certificate_row(row: &Row<'_>) -> RepoResult<Certificate> {
    Ok(Certificate {
        id: get_uuid(row, "id")?,
        certificate_no: row.get("certificate_no")?,
        kind: get_enum(row, "kind", CertificateKind::parse)?,
        intern_id: get_uuid(row, "intern_id")?,
        application_id: get_optional_uuid(row, "application_id")?,
        project_id: get_optional_uuid(row, "project_id")?,
        issued_by: get_uuid(row, "issued_by")?,
        issued_at: row.get("issued_at")?,
    })
}
