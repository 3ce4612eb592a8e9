//! Internship and project completion certificates.
//!
//! # Invariants
//! - One certificate per (kind, intern, project); re-issuing returns the
//!   stored record.
//! - `certificate_no` is `INT-YYYY-NNNNNN` or `PRJ-YYYY-NNNNNN`.

use super::application::ApplicationId;
use super::intern::InternId;
use super::project::ProjectId;
use super::user::UserId;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use serde::Serialize;
use uuid::Uuid;

pub type CertificateId = Uuid;

/// Organization name printed on every certificate.
pub const ISSUER_NAME: &str = "Indian Oil Corporation Limited";

// A4 landscape.
const PAGE_WIDTH_MM: f32 = 297.0;
const PAGE_HEIGHT_MM: f32 = 210.0;
const MARGIN_MM: f32 = 25.0;
const FIRST_BASELINE_MM: f32 = 175.0;

text_enum! {
    pub enum CertificateKind {
        Internship => "INTERNSHIP",
        Project => "PROJECT",
    }
}

impl CertificateKind {
    pub fn number_prefix(self) -> &'static str {
        match self {
            Self::Internship => "INT",
            Self::Project => "PRJ",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::Internship => "Certificate of Internship Completion",
            Self::Project => "Certificate of Project Completion",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: CertificateId,
    pub certificate_no: String,
    pub kind: CertificateKind,
    pub intern_id: InternId,
    pub application_id: Option<ApplicationId>,
    pub project_id: Option<ProjectId>,
    pub issued_by: UserId,
    pub issued_at: i64,
}

/// Builds a certificate number from the issue time.
///
/// The serial is the last six digits of the millisecond clock, matching the
/// intern code scheme; callers bump it on collision.
pub fn certificate_number(kind: CertificateKind, issued_at_ms: i64) -> String {
    let year = DateTime::<Utc>::from_timestamp_millis(issued_at_ms)
        .map(|at| at.year())
        .unwrap_or(1970);
    format!(
        "{}-{year}-{:06}",
        kind.number_prefix(),
        issued_at_ms.rem_euclid(1_000_000)
    )
}

/// Everything printed on a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateDocument {
    #[serde(flatten)]
    pub certificate: Certificate,
    pub intern_name: String,
    pub intern_code: String,
    pub institute: String,
    pub department: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub mentor_name: Option<String>,
    pub project_title: Option<String>,
    pub grade: Option<String>,
    pub rendered_text: String,
}

impl CertificateDocument {
    /// Fills `rendered_text` from the other fields.
    pub fn rendered(mut self) -> Self {
        self.rendered_text = render_text(&self);
        self
    }

    /// Lays the certificate text out on a single A4 landscape page.
    ///
    /// The issuer and title lines are set in bold; the rest in regular type.
    pub fn to_pdf(&self) -> Result<Vec<u8>, printpdf::Error> {
        let (doc, page, layer) = PdfDocument::new(
            self.certificate.certificate_no.as_str(),
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "certificate",
        );
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let canvas = doc.get_page(page).get_layer(layer);

        let mut baseline = FIRST_BASELINE_MM;
        for (index, line) in render_text(self).lines().enumerate() {
            let (font, size, advance) = if index < 2 {
                (&bold, 22.0, 14.0)
            } else {
                (&regular, 13.0, 9.0)
            };
            if !line.is_empty() {
                canvas.use_text(line, size, Mm(MARGIN_MM), Mm(baseline), font);
            }
            baseline -= advance;
        }
        doc.save_to_bytes()
    }
}

fn render_text(doc: &CertificateDocument) -> String {
    let issued_on = DateTime::<Utc>::from_timestamp_millis(doc.certificate.issued_at)
        .map(|at| at.date_naive().to_string())
        .unwrap_or_default();

    let mut lines = vec![
        ISSUER_NAME.to_string(),
        doc.certificate.kind.title().to_string(),
        String::new(),
        format!("This is to certify that {} ({})", doc.intern_name, doc.intern_code),
        format!("of {}", doc.institute),
    ];
    match doc.certificate.kind {
        CertificateKind::Internship => lines.push(format!(
            "has completed an internship in the {} department from {} to {}.",
            doc.department, doc.start_date, doc.end_date
        )),
        CertificateKind::Project => {
            let title = doc.project_title.as_deref().unwrap_or_default();
            lines.push(format!(
                "has successfully completed the project \"{title}\" in the {} department.",
                doc.department
            ));
            if let Some(grade) = &doc.grade {
                lines.push(format!("Grade: {grade}"));
            }
        }
    }
    if let Some(mentor) = &doc.mentor_name {
        lines.push(format!("Mentor: {mentor}"));
    }
    lines.push(String::new());
    lines.push(format!("Certificate No: {}", doc.certificate.certificate_no));
    lines.push(format!("Issued on: {issued_on}"));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::{certificate_number, Certificate, CertificateDocument, CertificateKind};
    use chrono::NaiveDate;
    use uuid::Uuid;

    // 2025-06-01T00:00:00.123Z
    const ISSUED_AT: i64 = 1_748_736_000_123;

    #[test]
    fn numbers_carry_prefix_year_and_serial() {
        assert_eq!(
            certificate_number(CertificateKind::Internship, ISSUED_AT),
            "INT-2025-000123"
        );
        assert_eq!(
            certificate_number(CertificateKind::Project, ISSUED_AT),
            "PRJ-2025-000123"
        );
    }

    fn project_document() -> CertificateDocument {
        CertificateDocument {
            certificate: Certificate {
                id: Uuid::new_v4(),
                certificate_no: "PRJ-2025-000123".to_string(),
                kind: CertificateKind::Project,
                intern_id: Uuid::new_v4(),
                application_id: None,
                project_id: Some(Uuid::new_v4()),
                issued_by: Uuid::new_v4(),
                issued_at: ISSUED_AT,
            },
            intern_name: "Rahul Sharma".to_string(),
            intern_code: "IOCL-000042".to_string(),
            institute: "NIT Trichy".to_string(),
            department: "Engineering".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 7, 31).unwrap(),
            mentor_name: Some("Meera Iyer".to_string()),
            project_title: Some("Pipeline telemetry dashboard".to_string()),
            grade: Some("A".to_string()),
            rendered_text: String::new(),
        }
        .rendered()
    }

    #[test]
    fn project_rendering_mentions_title_and_grade() {
        let doc = project_document();
        assert!(doc.rendered_text.contains("Certificate of Project Completion"));
        assert!(doc.rendered_text.contains("\"Pipeline telemetry dashboard\""));
        assert!(doc.rendered_text.contains("Grade: A"));
        assert!(doc.rendered_text.contains("Issued on: 2025-06-01"));
    }

    #[test]
    fn pdf_output_is_a_pdf_document() {
        let bytes = project_document().to_pdf().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }
}
