mod common;

use common::{admin, approved_intern, assign, caller, mentor, register, DEPARTMENT};
use internhub_core::model::assignment::NewAssignment;
use internhub_core::model::intern::InternStatus;
use internhub_core::model::mentor::{MentorAvailability, MentorPatch, NewMentor};
use internhub_core::model::task::NewTask;
use internhub_core::{
    open_db_in_memory, InternService, MentorService, Role, ServiceError, TaskService,
};

fn assignment(intern_id: uuid::Uuid, mentor_id: uuid::Uuid) -> NewAssignment {
    NewAssignment {
        intern_id,
        mentor_id,
        department: DEPARTMENT.to_string(),
    }
}

#[test]
fn new_mentor_defaults_to_available_with_three_slots() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);

    let mentor = MentorService::new(&conn)
        .create(
            &admin,
            NewMentor {
                emp_id: " EMP300 ".to_string(),
                name: "Kavita Joshi".to_string(),
                department: DEPARTMENT.to_string(),
                email: "Kavita@IOCL.example".to_string(),
                phone: None,
                experience: None,
                max_capacity: None,
            },
        )
        .unwrap();
    assert_eq!(mentor.emp_id, "EMP300");
    assert_eq!(mentor.email, "kavita@iocl.example");
    assert_eq!(mentor.max_capacity, 3);
    assert_eq!(mentor.current_interns, 0);
    assert_eq!(mentor.availability, MentorAvailability::Available);
}

#[test]
fn duplicate_mentor_emp_id_conflicts() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    let first = mentor(&conn, &admin, "EMP300", 3);

    let err = MentorService::new(&conn)
        .create(
            &admin,
            NewMentor {
                emp_id: first.emp_id.clone(),
                name: "Someone Else".to_string(),
                department: DEPARTMENT.to_string(),
                email: "else@iocl.example".to_string(),
                phone: None,
                experience: None,
                max_capacity: Some(2),
            },
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "Mentor with this employee id already exists");
}

#[test]
fn assignment_activates_intern_and_fills_capacity() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    let mentor = mentor(&conn, &admin, "EMP300", 1);
    let intern = approved_intern(&conn, &admin, "Rahul Sharma");
    let mentors = MentorService::new(&conn);

    let result = mentors.assign(&admin, assignment(intern.id, mentor.id)).unwrap();
    assert!(result.assignment.is_active);
    assert_eq!(result.intern.status, InternStatus::Active);
    assert_eq!(result.mentor.current_interns, 1);
    assert_eq!(result.mentor.availability, MentorAvailability::Busy);

    let second = approved_intern(&conn, &admin, "Priya Nair");
    let err = mentors.assign(&admin, assignment(second.id, mentor.id)).unwrap_err();
    match err {
        ServiceError::InvalidState(message) => {
            assert_eq!(message, "Mentor has reached maximum capacity (1/1)")
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(mentors.available(&admin, DEPARTMENT).unwrap().is_empty());
}

#[test]
fn assignment_requires_approved_intern() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    let mentor = mentor(&conn, &admin, "EMP300", 2);
    let intern = register(&conn, &admin, "Rahul Sharma");

    let err = MentorService::new(&conn)
        .assign(&admin, assignment(intern.id, mentor.id))
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
}

#[test]
fn assignment_rejects_unavailable_mentor_and_unknown_records() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    let mentor = mentor(&conn, &admin, "EMP300", 2);
    let intern = approved_intern(&conn, &admin, "Rahul Sharma");
    let mentors = MentorService::new(&conn);
    mentors
        .update(
            &admin,
            mentor.id,
            MentorPatch {
                availability: Some(MentorAvailability::Unavailable),
                ..MentorPatch::default()
            },
        )
        .unwrap();

    let err = mentors.assign(&admin, assignment(intern.id, mentor.id)).unwrap_err();
    assert_eq!(err.to_string(), "Mentor is unavailable");

    let err = mentors
        .assign(&admin, assignment(intern.id, uuid::Uuid::new_v4()))
        .unwrap_err();
    assert_eq!(err.to_string(), "Mentor not found");
    let err = mentors
        .assign(&admin, assignment(uuid::Uuid::new_v4(), mentor.id))
        .unwrap_err();
    assert_eq!(err.to_string(), "Intern not found");
}

#[test]
fn unassign_returns_intern_to_approved_and_frees_slot() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    let mentor = mentor(&conn, &admin, "EMP300", 1);
    let intern = approved_intern(&conn, &admin, "Rahul Sharma");
    assign(&conn, &admin, &intern, &mentor);
    let mentors = MentorService::new(&conn);

    mentors.unassign(&admin, intern.id).unwrap();

    let detail = InternService::new(&conn).get(&admin, intern.id).unwrap();
    assert_eq!(detail.intern.status, InternStatus::Approved);
    assert!(detail.assignment.is_none());
    let available = mentors.available(&admin, DEPARTMENT).unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].availability, MentorAvailability::Available);

    let err = mentors.unassign(&admin, intern.id).unwrap_err();
    assert_eq!(err.to_string(), "No active assignment found for this intern");
}

#[test]
fn reassigning_the_same_pair_reactivates_the_row() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    let mentor = mentor(&conn, &admin, "EMP300", 2);
    let intern = approved_intern(&conn, &admin, "Rahul Sharma");
    let mentors = MentorService::new(&conn);

    let first = mentors.assign(&admin, assignment(intern.id, mentor.id)).unwrap();
    mentors.unassign(&admin, intern.id).unwrap();
    let second = mentors.assign(&admin, assignment(intern.id, mentor.id)).unwrap();

    assert_eq!(first.assignment.id, second.assignment.id);
    assert!(second.assignment.is_active);
    assert_eq!(second.mentor.current_interns, 1);
}

#[test]
fn intern_with_active_mentor_cannot_be_assigned_twice() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    let first = mentor(&conn, &admin, "EMP300", 2);
    let second = mentor(&conn, &admin, "EMP301", 2);
    let intern = approved_intern(&conn, &admin, "Rahul Sharma");
    assign(&conn, &admin, &intern, &first);

    let err = MentorService::new(&conn)
        .assign(&admin, assignment(intern.id, second.id))
        .unwrap_err();
    // The intern is ACTIVE now, so the status check fires first.
    assert!(matches!(err, ServiceError::InvalidState(_)));
}

#[test]
fn available_sorts_by_load_then_name() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    let busy = mentor(&conn, &admin, "EMP300", 3);
    mentor(&conn, &admin, "EMP302", 3);
    mentor(&conn, &admin, "EMP301", 3);
    let intern = approved_intern(&conn, &admin, "Rahul Sharma");
    assign(&conn, &admin, &intern, &busy);

    let names: Vec<_> = MentorService::new(&conn)
        .available(&admin, DEPARTMENT)
        .unwrap()
        .into_iter()
        .map(|mentor| mentor.emp_id)
        .collect();
    assert_eq!(names, vec!["EMP301", "EMP302", "EMP300"]);
}

#[test]
fn list_reports_durations_and_filters_by_availability() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    let full = mentor(&conn, &admin, "EMP300", 1);
    mentor(&conn, &admin, "EMP301", 2);
    let intern = approved_intern(&conn, &admin, "Rahul Sharma");
    assign(&conn, &admin, &intern, &full);
    let mentors = MentorService::new(&conn);

    let all = mentors.list(None, None).unwrap();
    assert_eq!(all.len(), 2);
    let busy = mentors.list(None, Some(MentorAvailability::Busy)).unwrap();
    assert_eq!(busy.len(), 1);
    assert_eq!(busy[0].mentor.id, full.id);
    assert_eq!(busy[0].intern_durations.len(), 1);
    assert_eq!(busy[0].intern_durations[0].intern_code, intern.intern_code);
    assert!(mentors.list(Some("Finance"), None).unwrap().is_empty());
}

#[test]
fn stale_load_is_reconciled_on_listing() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    let mentor = mentor(&conn, &admin, "EMP300", 2);
    conn.execute(
        "UPDATE mentors SET current_interns = 2, availability = 'BUSY' WHERE id = ?1;",
        [mentor.id.to_string()],
    )
    .unwrap();

    let listed = MentorService::new(&conn).list(None, None).unwrap();
    assert_eq!(listed[0].mentor.current_interns, 0);
    assert_eq!(listed[0].mentor.availability, MentorAvailability::Available);
}

#[test]
fn delete_is_blocked_by_active_interns_and_history() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    let mentor = mentor(&conn, &admin, "EMP300", 2);
    let intern = approved_intern(&conn, &admin, "Rahul Sharma");
    assign(&conn, &admin, &intern, &mentor);
    let mentors = MentorService::new(&conn);

    let err = mentors.delete(&admin, mentor.id).unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));

    TaskService::new(&conn)
        .create(
            &admin,
            NewTask {
                intern_id: intern.id,
                title: "Set up workstation".to_string(),
                description: "Install the toolchain".to_string(),
                due_date: chrono::NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
                priority: None,
            },
        )
        .unwrap();
    mentors.unassign(&admin, intern.id).unwrap();
    let err = mentors.delete(&admin, mentor.id).unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));

    let idle = common::mentor(&conn, &admin, "EMP399", 2);
    mentors.delete(&admin, idle.id).unwrap();
    assert!(mentors.list(None, None).unwrap().iter().all(|o| o.mentor.id != idle.id));
}

#[test]
fn mentors_only_list_their_own_interns() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    let owner = mentor(&conn, &admin, "EMP300", 2);
    let other = mentor(&conn, &admin, "EMP301", 2);
    let intern = approved_intern(&conn, &admin, "Rahul Sharma");
    assign(&conn, &admin, &intern, &owner);
    let owner_caller = caller(&conn, Role::Mentor, Some("EMP300"));
    let mentors = MentorService::new(&conn);

    let mentored = mentors.interns_of(&owner_caller, owner.id).unwrap();
    assert_eq!(mentored.len(), 1);
    assert_eq!(mentored[0].intern.id, intern.id);

    let err = mentors.interns_of(&owner_caller, other.id).unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
}

#[test]
fn capacity_patch_rederives_availability() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    let lead = mentor(&conn, &admin, "EMP310", 3);
    for name in ["First Intern", "Second Intern"] {
        let intern = approved_intern(&conn, &admin, name);
        assign(&conn, &admin, &intern, &lead);
    }
    let mentors = MentorService::new(&conn);
    let patch_capacity = |max_capacity| MentorPatch {
        max_capacity: Some(max_capacity),
        ..MentorPatch::default()
    };

    let shrunk = mentors.update(&admin, lead.id, patch_capacity(2)).unwrap();
    assert_eq!(shrunk.current_interns, 2);
    assert_eq!(shrunk.availability, MentorAvailability::Busy);

    let grown = mentors.update(&admin, lead.id, patch_capacity(3)).unwrap();
    assert_eq!(grown.availability, MentorAvailability::Available);

    let forced_busy = mentors
        .update(
            &admin,
            lead.id,
            MentorPatch {
                availability: Some(MentorAvailability::Busy),
                ..MentorPatch::default()
            },
        )
        .unwrap();
    assert_eq!(forced_busy.availability, MentorAvailability::Available);
}

#[test]
fn mentored_interns_are_listed_latest_assignment_first() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    let lead = mentor(&conn, &admin, "EMP320", 3);
    let earlier = approved_intern(&conn, &admin, "Earlier Intern");
    let later = approved_intern(&conn, &admin, "Later Intern");

    assign(&conn, &admin, &earlier, &lead);
    std::thread::sleep(std::time::Duration::from_millis(5));
    assign(&conn, &admin, &later, &lead);

    let mentored = MentorService::new(&conn).interns_of(&admin, lead.id).unwrap();
    let names: Vec<&str> = mentored.iter().map(|entry| entry.intern.name.as_str()).collect();
    assert_eq!(names, ["Later Intern", "Earlier Intern"]);
}
