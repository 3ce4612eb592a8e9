#![allow(dead_code)]

use chrono::NaiveDate;
use internhub_core::model::application::{ApplicationReview, ApplicationStatus};
use internhub_core::model::assignment::NewAssignment;
use internhub_core::model::intern::{Intern, NewIntern};
use internhub_core::model::mentor::{Mentor, NewMentor};
use internhub_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use internhub_core::{
    ApplicationService, Caller, InternService, MentorService, Role, User,
};
use rusqlite::Connection;
use std::collections::BTreeMap;
use uuid::Uuid;

pub const DEPARTMENT: &str = "Information Technology";

/// Inserts an account row and returns its caller identity.
///
/// The stored hash is not a PHC string, so the account cannot log in.
pub fn caller(conn: &Connection, role: Role, emp_id: Option<&str>) -> Caller {
    let id = Uuid::new_v4();
    let user = User {
        id,
        username: format!("user-{}", id.simple()),
        password_hash: "not-a-hash".to_string(),
        role,
        emp_id: emp_id.map(str::to_string),
        name: "Test Account".to_string(),
        email: None,
        phone: None,
        department: Some(DEPARTMENT.to_string()),
        is_first_login: true,
        created_at: 0,
        updated_at: 0,
    };
    SqliteUserRepository::new(conn).create_user(&user).unwrap();
    Caller::from_user(&user)
}

pub fn admin(conn: &Connection) -> Caller {
    caller(conn, Role::Admin, None)
}

pub fn registration(name: &str, referrer_emp_id: &str) -> NewIntern {
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
        referred_by_emp_id: referrer_emp_id.to_string(),
    }
}

pub fn register(conn: &Connection, admin: &Caller, name: &str) -> Intern {
    InternService::new(conn)
        .create(admin, registration(name, "EMP100"))
        .unwrap()
        .intern
}

/// Registers an intern and approves its application.
pub fn approved_intern(conn: &Connection, admin: &Caller, name: &str) -> Intern {
    let intern = register(conn, admin, name);
    let applications = ApplicationService::new(conn);
    let application = applications.for_intern(admin, intern.id).unwrap();
    applications
        .review(
            admin,
            application.application.id,
            ApplicationReview {
                status: ApplicationStatus::Approved,
                review_notes: None,
            },
        )
        .unwrap();
    InternService::new(conn).get(admin, intern.id).unwrap().intern
}

pub fn mentor(conn: &Connection, admin: &Caller, emp_id: &str, max_capacity: u32) -> Mentor {
    MentorService::new(conn)
        .create(
            admin,
            NewMentor {
                emp_id: emp_id.to_string(),
                name: format!("Mentor {emp_id}"),
                department: DEPARTMENT.to_string(),
                email: format!("{}@iocl.example", emp_id.to_lowercase()),
                phone: None,
                experience: Some("8 years".to_string()),
                max_capacity: Some(max_capacity),
            },
        )
        .unwrap()
}

pub fn assign(conn: &Connection, admin: &Caller, intern: &Intern, mentor: &Mentor) {
    MentorService::new(conn)
        .assign(
            admin,
            NewAssignment {
                intern_id: intern.id,
                mentor_id: mentor.id,
                department: DEPARTMENT.to_string(),
            },
        )
        .unwrap();
}

/// An approved intern actively assigned to a fresh mentor, plus both callers.
pub struct Pairing {
    pub intern: Intern,
    pub mentor: Mentor,
    pub intern_caller: Caller,
    pub mentor_caller: Caller,
}

pub fn pairing(conn: &Connection, admin: &Caller, intern_name: &str, mentor_emp_id: &str) -> Pairing {
    let intern = approved_intern(conn, admin, intern_name);
    let mentor = mentor(conn, admin, mentor_emp_id, 3);
    assign(conn, admin, &intern, &mentor);
    Pairing {
        intern_caller: caller(conn, Role::Intern, Some(&intern.intern_code)),
        mentor_caller: caller(conn, Role::Mentor, Some(mentor_emp_id)),
        intern,
        mentor,
    }
}
