//! HTTP-level tests for the InternHub router.
//!
//! Each test seeds an in-memory database through the core services, builds
//! the router around it and drives requests with `tower::ServiceExt::oneshot`.

use std::collections::{BTreeMap, HashMap};

use axum::body::Body;
use axum::Router;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use hyper::{Request, Response, StatusCode};
use internhub_core::model::application::{ApplicationReview, ApplicationStatus};
use internhub_core::model::assignment::NewAssignment;
use internhub_core::model::intern::{Intern, NewIntern};
use internhub_core::model::mentor::{Mentor, NewMentor};
use internhub_core::{
    open_db_in_memory, ApplicationService, AuthService, Caller, InternService, MentorService,
    NewUser, Role, TokenKeys,
};
use internhub_server::{build_router, AppState, ServerConfig};
use serde_json::{json, Value};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;
use tower::ServiceExt;

const JWT_SECRET: &str = "http-test-secret-0123456789-abcdefghij";
const DEPARTMENT: &str = "Information Technology";
const PASSWORD: &str = "Str0ngPassw0rd";
const BOUNDARY: &str = "internhub-test-boundary";

// ── Fixture ────────────────────────────────────────────────────

struct TestApp {
    router: Router,
    uploads: TempDir,
    intern: Intern,
    mentor: Mentor,
}

fn account(username: &str, role: Role, emp_id: Option<&str>) -> NewUser {
    NewUser {
        username: username.to_string(),
        password: PASSWORD.to_string(),
        role,
        emp_id: emp_id.map(str::to_string),
        name: format!("{username} account"),
        email: None,
        phone: None,
        department: Some(DEPARTMENT.to_string()),
    }
}

fn registration(name: &str) -> NewIntern {
    NewIntern {
        name: name.to_string(),
        email: format!("{}@college.edu", name.to_lowercase().replace(' ', ".")),
        phone: "9876543210".to_string(),
        institute: "NIT Trichy".to_string(),
        course: "B.Tech".to_string(),
        semester: "6".to_string(),
        roll_number: "CS21B042".to_string(),
        department: DEPARTMENT.to_string(),
        start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 7, 31).unwrap(),
        address: "12 Refinery Road, Panipat".to_string(),
        documents: BTreeMap::new(),
        referred_by: "Suresh Kumar".to_string(),
        referred_by_emp_id: "EMP100".to_string(),
    }
}

/// Accounts `admin`, `employee` (EMP100), `mentor` (MEN001), `outsider`
/// (MEN999, no mentor record) and `intern`, plus one approved intern actively
/// assigned to MEN001.
fn test_app() -> TestApp {
    let conn = open_db_in_memory().unwrap();
    let keys = TokenKeys::from_secret(JWT_SECRET.as_bytes(), 3600).unwrap();

    let (intern, mentor) = {
        let auth = AuthService::new(&conn, &keys);
        let admin = auth.create_user(account("admin", Role::Admin, None)).unwrap();
        auth.create_user(account("employee", Role::Employee, Some("EMP100")))
            .unwrap();
        auth.create_user(account("mentor", Role::Mentor, Some("MEN001")))
            .unwrap();
        auth.create_user(account("outsider", Role::Mentor, Some("MEN999")))
            .unwrap();
        let admin = Caller::from_user(&admin);

        let intern = InternService::new(&conn)
            .create(&admin, registration("Priya Patel"))
            .unwrap()
            .intern;
        let applications = ApplicationService::new(&conn);
        let application = applications.for_intern(&admin, intern.id).unwrap();
        applications
            .review(
                &admin,
                application.application.id,
                ApplicationReview {
                    status: ApplicationStatus::Approved,
                    review_notes: None,
                },
            )
            .unwrap();

        let mentors = MentorService::new(&conn);
        let mentor = mentors
            .create(
                &admin,
                NewMentor {
                    emp_id: "MEN001".to_string(),
                    name: "Anita Sharma".to_string(),
                    department: DEPARTMENT.to_string(),
                    email: "men001@iocl.example".to_string(),
                    phone: None,
                    experience: Some("12 years".to_string()),
                    max_capacity: Some(3),
                },
            )
            .unwrap();
        mentors
            .assign(
                &admin,
                NewAssignment {
                    intern_id: intern.id,
                    mentor_id: mentor.id,
                    department: DEPARTMENT.to_string(),
                },
            )
            .unwrap();

        auth.create_user(account("intern", Role::Intern, Some(&intern.intern_code)))
            .unwrap();
        (intern, mentor)
    };

    let uploads = tempfile::tempdir().unwrap();
    let upload_dir = uploads.path().to_string_lossy().into_owned();
    let env: HashMap<&str, String> = HashMap::from([
        ("JWT_SECRET", JWT_SECRET.to_string()),
        ("UPLOAD_DIR", upload_dir),
        ("MAX_FILE_SIZE", "1024".to_string()),
    ]);
    let config = ServerConfig::from_lookup(|key| env.get(key).cloned()).unwrap();

    TestApp {
        router: build_router(AppState::new(conn, keys, config)),
        uploads,
        intern,
        mentor,
    }
}

// ── Request helpers ────────────────────────────────────────────

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    /// Raw GET for non-JSON bodies.
    async fn fetch(&self, uri: &str, token: &str) -> Response<Body> {
        let request = Request::builder()
            .uri(uri)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn login(&self, username: &str) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "username": username, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }

    async fn upload(
        &self,
        token: &str,
        project_id: &str,
        part: Option<(&str, &[u8])>,
    ) -> (StatusCode, Value) {
        let mut body = Vec::new();
        if let Some((content_type, bytes)) = part {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"report\"; \
                     filename=\"report.pdf\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/projects/{project_id}/upload"))
            .header("authorization", format!("Bearer {token}"))
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }
}

// ── Auth and envelope ──────────────────────────────────────────

#[tokio::test]
async fn health_is_public() {
    let app = test_app();
    let (status, body) = app.call("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_valid_bearer_token() {
    let app = test_app();

    let (status, body) = app.call("GET", "/api/interns", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Access token required");

    let (status, body) = app
        .call("GET", "/api/interns", Some("not.a.jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn login_returns_token_and_profile_without_hash() {
    let app = test_app();
    let (status, body) = app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "username": "mentor", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["data"]["user"]["role"], "MENTOR");
    assert!(body["data"]["user"].get("passwordHash").is_none());

    let token = body["data"]["token"].as_str().unwrap();
    let (status, body) = app
        .call("POST", "/api/auth/verify-token", Some(token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["empId"], "MEN001");
}

#[tokio::test]
async fn wrong_password_is_a_generic_401() {
    let app = test_app();
    let (status, body) = app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "username": "admin", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn malformed_json_is_a_400_envelope() {
    let app = test_app();
    let token = app.login("admin").await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/interns")
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

// ── Interns and applications ───────────────────────────────────

#[tokio::test]
async fn admin_registers_and_approves_an_intern() {
    let app = test_app();
    let token = app.login("admin").await;

    let payload = json!({
        "name": "Rahul Verma",
        "email": "rahul.verma@college.edu",
        "phone": "9123456780",
        "institute": "IIT Delhi",
        "course": "B.Tech",
        "semester": "7",
        "rollNumber": "2021CS10234",
        "department": DEPARTMENT,
        "startDate": "2025-06-01",
        "endDate": "2025-07-31",
        "address": "Sector 12, Panipat",
        "referredBy": "Suresh Kumar",
        "referredByEmpId": "EMP100"
    });
    let (status, body) = app
        .call("POST", "/api/interns", Some(&token), Some(payload))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["message"], "Intern registered successfully");
    assert_eq!(body["data"]["intern"]["status"], "SUBMITTED");
    let application_id = body["data"]["application"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .call("GET", "/api/applications/status/pending", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let uri = format!("/api/applications/{application_id}");
    let decision = json!({ "status": "APPROVED", "reviewNotes": "Strong profile" });
    let (status, body) = app
        .call("PUT", &uri, Some(&token), Some(decision.clone()))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "APPROVED");

    let (status, _) = app.call("PUT", &uri, Some(&token), Some(decision)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn intern_listing_is_paginated() {
    let app = test_app();
    let token = app.login("admin").await;
    let (status, body) = app
        .call("GET", "/api/interns?page=1&limit=1", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["limit"], 1);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["pagination"]["pages"], 1);
}

#[tokio::test]
async fn employee_sees_referred_interns_but_cannot_manage_mentors() {
    let app = test_app();
    let token = app.login("employee").await;

    let (status, body) = app.call("GET", "/api/interns", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);

    let (status, body) = app
        .call(
            "POST",
            "/api/mentors",
            Some(&token),
            Some(json!({
                "empId": "MEN002",
                "name": "Vikram Singh",
                "department": DEPARTMENT,
                "email": "men002@iocl.example"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn unknown_and_malformed_ids() {
    let app = test_app();
    let token = app.login("admin").await;

    let missing = format!("/api/interns/{}", uuid::Uuid::new_v4());
    let (status, body) = app.call("GET", &missing, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .call("GET", "/api/interns/not-a-uuid", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Mentors ────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_mentor_emp_id_conflicts() {
    let app = test_app();
    let token = app.login("admin").await;
    let (status, body) = app
        .call(
            "POST",
            "/api/mentors",
            Some(&token),
            Some(json!({
                "empId": "MEN001",
                "name": "Someone Else",
                "department": DEPARTMENT,
                "email": "other@iocl.example"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
}

#[tokio::test]
async fn mentor_sees_assigned_interns() {
    let app = test_app();
    let token = app.login("mentor").await;
    let uri = format!("/api/mentors/{}/interns", app.mentor.id);
    let (status, body) = app.call("GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let interns = body["data"].as_array().unwrap();
    assert_eq!(interns.len(), 1);

    let (status, _) = app
        .call(
            "GET",
            "/api/mentors/available/Information%20Technology",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.login("admin").await;
    let (status, body) = app
        .call(
            "GET",
            "/api/mentors/available/Information%20Technology",
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"][0]["empId"], "MEN001");
}

// ── Tasks ──────────────────────────────────────────────────────

#[tokio::test]
async fn task_flow_between_mentor_and_intern() {
    let app = test_app();
    let mentor = app.login("mentor").await;
    let intern = app.login("intern").await;

    let (status, body) = app
        .call(
            "POST",
            "/api/tasks",
            Some(&mentor),
            Some(json!({
                "internId": app.intern.id,
                "title": "Set up the data pipeline",
                "description": "Ingest refinery sensor logs",
                "dueDate": "2025-06-20",
                "priority": "HIGH"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let task_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["mentor"]["empId"], "MEN001");

    let (status, body) = app.call("GET", "/api/tasks", Some(&intern), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);

    let uri = format!("/api/tasks/{task_id}");
    let (status, body) = app
        .call("PUT", &uri, Some(&intern), Some(json!({ "status": "COMPLETED" })))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "COMPLETED");

    let (status, _) = app.call("DELETE", &uri, Some(&intern), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.call("DELETE", &uri, Some(&mentor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Task deleted successfully");
}

// ── Projects and certificates ──────────────────────────────────

async fn submit_project(app: &TestApp, token: &str) -> String {
    let (status, body) = app
        .call(
            "POST",
            "/api/projects",
            Some(token),
            Some(json!({
                "title": "Predictive maintenance dashboard",
                "description": "Anomaly detection on pump telemetry"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn intern_uploads_pdf_report() {
    let app = test_app();
    let token = app.login("intern").await;
    let project_id = submit_project(&app, &token).await;

    let (status, body) = app
        .upload(&token, &project_id, Some(("application/pdf", &b"%PDF-1.4 test"[..])))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(
        body["data"]["fileUrl"],
        format!("/uploads/projects/{project_id}/project-report.pdf")
    );
    let stored = app
        .uploads
        .path()
        .join("projects")
        .join(&project_id)
        .join("project-report.pdf");
    assert_eq!(std::fs::read(stored).unwrap(), b"%PDF-1.4 test");
}

#[tokio::test]
async fn stored_reports_follow_project_scope() {
    let app = test_app();
    let intern = app.login("intern").await;
    let outsider = app.login("outsider").await;
    let project_id = submit_project(&app, &intern).await;

    let report_uri = format!("/api/projects/{project_id}/report");
    let (status, body) = app.call("GET", &report_uri, Some(&intern), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No report uploaded");

    let (status, body) = app
        .upload(&intern, &project_id, Some(("application/pdf", &b"%PDF-1.4 private"[..])))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let file_url = body["data"]["fileUrl"].as_str().unwrap().to_string();

    for uri in [report_uri.as_str(), file_url.as_str()] {
        let response = app.fetch(uri, &intern).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_eq!(response.headers()["content-type"], "application/pdf");
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"%PDF-1.4 private");

        let (status, body) = app.call("GET", uri, Some(&outsider), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body["success"], false);

        let (status, _) = app.call("GET", uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn upload_rejects_non_pdf_missing_and_oversized_files() {
    let app = test_app();
    let token = app.login("intern").await;
    let project_id = submit_project(&app, &token).await;

    let (status, body) = app
        .upload(&token, &project_id, Some(("text/plain", &b"hello"[..])))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Only PDF files are allowed");

    let (status, body) = app.upload(&token, &project_id, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file uploaded");

    let oversized = vec![b'x'; 2048];
    let (status, _) = app
        .upload(&token, &project_id, Some(("application/pdf", oversized.as_slice())))
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn approved_project_yields_a_certificate() {
    let app = test_app();
    let intern = app.login("intern").await;
    let mentor = app.login("mentor").await;
    let project_id = submit_project(&app, &intern).await;

    let (status, body) = app
        .call(
            "PUT",
            &format!("/api/projects/{project_id}/review"),
            Some(&mentor),
            Some(json!({ "status": "APPROVED", "feedback": "Well done", "grade": "A" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["data"]["reviewedAt"].is_i64());

    let (status, body) = app
        .call(
            "POST",
            &format!("/api/certificates/project/{project_id}"),
            Some(&mentor),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let number = body["data"]["certificateNo"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(number.starts_with("PRJ-"));
    assert_eq!(body["data"]["grade"], "A");

    let (status, body) = app
        .call("GET", &format!("/api/certificates/{number}"), Some(&intern), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["internCode"], app.intern.intern_code);

    let response = app
        .fetch(&format!("/api/certificates/{number}/pdf"), &intern)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/pdf");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.starts_with(b"%PDF"));

    let outsider = app.login("outsider").await;
    let (status, _) = app
        .call("GET", &format!("/api/certificates/{number}/pdf"), Some(&outsider), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ── Status events ──────────────────────────────────────────────

/// Next `data:` payload on an event stream, or `None` if nothing arrives.
async fn next_event(body: &mut Body, wait: Duration) -> Option<Value> {
    loop {
        let frame = timeout(wait, body.frame()).await.ok()??.unwrap();
        let Ok(chunk) = frame.into_data() else { continue };
        let text = String::from_utf8(chunk.to_vec()).unwrap();
        if let Some(data) = text.lines().find_map(|line| line.strip_prefix("data: ")) {
            return Some(serde_json::from_str(data).unwrap());
        }
    }
}

#[tokio::test]
async fn application_reviews_are_pushed_to_readers() {
    let app = test_app();
    let admin = app.login("admin").await;
    let intern = app.login("intern").await;

    let admin_stream = app.fetch("/api/applications/events", &admin).await;
    assert_eq!(admin_stream.status(), StatusCode::OK);
    assert_eq!(admin_stream.headers()["content-type"], "text/event-stream");
    let mut admin_events = admin_stream.into_body();
    let mut intern_events = app
        .fetch("/api/applications/events", &intern)
        .await
        .into_body();

    let (status, body) = app
        .call(
            "POST",
            "/api/interns",
            Some(&admin),
            Some(json!({
                "name": "Rahul Verma",
                "email": "rahul.verma@college.edu",
                "phone": "9123456780",
                "institute": "IIT Delhi",
                "course": "B.Tech",
                "semester": "7",
                "rollNumber": "2021CS10234",
                "department": DEPARTMENT,
                "startDate": "2025-06-01",
                "endDate": "2025-07-31",
                "address": "Sector 12, Panipat",
                "referredBy": "Suresh Kumar",
                "referredByEmpId": "EMP100"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let application_id = body["data"]["application"]["id"].clone();

    let (status, _) = app
        .call(
            "PUT",
            &format!("/api/applications/{}", application_id.as_str().unwrap()),
            Some(&admin),
            Some(json!({ "status": "REJECTED" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let event = next_event(&mut admin_events, Duration::from_secs(2))
        .await
        .expect("admin receives the review");
    assert_eq!(event["type"], "APPLICATION_STATUS");
    assert_eq!(event["id"], application_id);
    assert_eq!(event["status"], "REJECTED");

    // Someone else's application stays invisible to the intern.
    assert!(next_event(&mut intern_events, Duration::from_millis(300))
        .await
        .is_none());
}
