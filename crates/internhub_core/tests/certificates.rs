mod common;

use common::{admin, approved_intern, caller, pairing, register, Pairing};
use internhub_core::model::certificate::CertificateKind;
use internhub_core::model::project::{NewProject, ProjectReview, ProjectStatus};
use internhub_core::{
    open_db_in_memory, ApplicationService, Caller, CertificateService, InternService,
    ProjectService, Role, ServiceError,
};
use rusqlite::Connection;

fn approved_project(conn: &Connection, pairing: &Pairing, grade: &str) -> uuid::Uuid {
    let projects = ProjectService::new(conn);
    let project = projects
        .submit(
            &pairing.intern_caller,
            NewProject {
                intern_id: None,
                title: "Refinery dashboard".to_string(),
                description: None,
            },
        )
        .unwrap();
    projects
        .review(
            &pairing.mentor_caller,
            project.record.id,
            ProjectReview {
                status: ProjectStatus::Approved,
                feedback: None,
                grade: Some(grade.to_string()),
            },
        )
        .unwrap();
    project.record.id
}

fn application_of(conn: &Connection, admin: &Caller, intern_id: uuid::Uuid) -> uuid::Uuid {
    ApplicationService::new(conn)
        .for_intern(admin, intern_id)
        .unwrap()
        .application
        .id
}

#[test]
fn internship_certificate_is_issued_once() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    let pairing = pairing(&conn, &admin, "Rahul Sharma", "EMP300");
    let application_id = application_of(&conn, &admin, pairing.intern.id);
    let certificates = CertificateService::new(&conn);

    let first = certificates.issue_internship(&admin, application_id).unwrap();
    let second = certificates.issue_internship(&admin, application_id).unwrap();

    assert_eq!(first.certificate.kind, CertificateKind::Internship);
    assert!(first.certificate.certificate_no.starts_with("INT-"));
    assert_eq!(first.certificate.certificate_no, second.certificate.certificate_no);
    assert_eq!(first.mentor_name.as_deref(), Some("Mentor EMP300"));
    assert!(first.rendered_text.contains("Rahul Sharma"));
    assert!(first.rendered_text.contains("Indian Oil Corporation Limited"));
}

#[test]
fn internship_certificate_requires_approved_and_active_intern() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    let certificates = CertificateService::new(&conn);

    let submitted = register(&conn, &admin, "Rahul Sharma");
    let err = certificates
        .issue_internship(&admin, application_of(&conn, &admin, submitted.id))
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));

    let unassigned = approved_intern(&conn, &admin, "Priya Nair");
    let err = certificates
        .issue_internship(&admin, application_of(&conn, &admin, unassigned.id))
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));

    let employee = caller(&conn, Role::Employee, Some("EMP100"));
    let err = certificates
        .issue_internship(&employee, application_of(&conn, &admin, unassigned.id))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
}

#[test]
fn completed_intern_still_gets_internship_certificate() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    let pairing = pairing(&conn, &admin, "Rahul Sharma", "EMP300");
    InternService::new(&conn).complete(&admin, pairing.intern.id).unwrap();

    let document = CertificateService::new(&conn)
        .issue_internship(&admin, application_of(&conn, &admin, pairing.intern.id))
        .unwrap();
    assert_eq!(document.mentor_name, None);
}

#[test]
fn project_certificate_carries_title_and_grade() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    let pairing = pairing(&conn, &admin, "Rahul Sharma", "EMP300");
    let project_id = approved_project(&conn, &pairing, "A+");
    let certificates = CertificateService::new(&conn);

    let document = certificates.issue_project(&pairing.mentor_caller, project_id).unwrap();
    assert!(document.certificate.certificate_no.starts_with("PRJ-"));
    assert_eq!(document.project_title.as_deref(), Some("Refinery dashboard"));
    assert_eq!(document.grade.as_deref(), Some("A+"));
    assert!(document.rendered_text.contains("Grade: A+"));

    let fetched = certificates
        .get(&pairing.intern_caller, &document.certificate.certificate_no)
        .unwrap();
    assert_eq!(fetched.certificate.id, document.certificate.id);
}

#[test]
fn project_certificate_requires_approval_and_ownership() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    let first = pairing(&conn, &admin, "Rahul Sharma", "EMP300");
    let second = pairing(&conn, &admin, "Priya Nair", "EMP301");
    let project = ProjectService::new(&conn)
        .submit(
            &first.intern_caller,
            NewProject {
                intern_id: None,
                title: "Refinery dashboard".to_string(),
                description: None,
            },
        )
        .unwrap();
    let certificates = CertificateService::new(&conn);

    let err = certificates.issue_project(&admin, project.record.id).unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
    let err = certificates
        .issue_project(&second.mentor_caller, project.record.id)
        .unwrap_err();
    assert_eq!(err.to_string(), "Access denied");
}

#[test]
fn intern_code_lookup_uses_latest_approved_project() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    let first = pairing(&conn, &admin, "Rahul Sharma", "EMP300");
    let second = pairing(&conn, &admin, "Priya Nair", "EMP301");
    let certificates = CertificateService::new(&conn);

    let err = certificates
        .issue_for_intern(&first.intern_caller, &first.intern.intern_code)
        .unwrap_err();
    assert_eq!(err.to_string(), "No approved project found for this intern");

    let project_id = approved_project(&conn, &first, "B");
    let document = certificates
        .issue_for_intern(&first.intern_caller, &first.intern.intern_code)
        .unwrap();
    assert_eq!(document.certificate.project_id, Some(project_id));

    let err = certificates
        .issue_for_intern(&second.intern_caller, &first.intern.intern_code)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
    let employee = caller(&conn, Role::Employee, Some("EMP100"));
    let err = certificates
        .issue_for_intern(&employee, &first.intern.intern_code)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let err = certificates
        .get(&second.intern_caller, &document.certificate.certificate_no)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
    let err = certificates.get(&admin, "PRJ-1999-000000").unwrap_err();
    assert_eq!(err.to_string(), "Certificate not found");
}

#[test]
fn pdf_is_rendered_for_readers_only() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    let pairing = pairing(&conn, &admin, "Rahul Sharma", "EMP300");
    let project_id = approved_project(&conn, &pairing, "A");
    let certificates = CertificateService::new(&conn);
    let issued = certificates
        .issue_project(&pairing.mentor_caller, project_id)
        .unwrap();
    let number = issued.certificate.certificate_no;

    let pdf = certificates.pdf(&pairing.intern_caller, &number).unwrap();
    assert!(pdf.starts_with(b"%PDF-"));

    let outsider = caller(&conn, Role::Intern, Some("IOCL-999999"));
    let err = certificates.pdf(&outsider, &number).unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
}
