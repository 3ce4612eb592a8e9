//! Caller identity and record-level access rules.
//!
//! # Invariants
//! - Role checks fail with `Insufficient permissions`; ownership checks fail
//!   with `Access denied`.
//! - MENTOR and INTERN callers without a linked record see nothing.

use super::{ServiceError, ServiceResult};
use crate::model::intern::{Intern, InternId};
use crate::model::mentor::{Mentor, MentorId};
use crate::model::user::{Role, User, UserId};
use crate::model::InternRef;
use crate::repo::assignment_repo::{AssignmentRepository, SqliteAssignmentRepository};
use crate::repo::intern_repo::{InternRepository, SqliteInternRepository};
use crate::repo::mentor_repo::{MentorRepository, SqliteMentorRepository};
use crate::repo::Scope;
use rusqlite::Connection;
use serde::Serialize;

/// Authenticated principal of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Caller {
    pub user_id: UserId,
    pub emp_id: Option<String>,
    pub role: Role,
    pub username: String,
}

impl Caller {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            emp_id: user.emp_id.clone(),
            role: user.role,
            username: user.username.clone(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_any(&self, roles: &[Role]) -> ServiceResult<()> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(ServiceError::insufficient_permissions())
        }
    }
}

/// Mentor record linked to a MENTOR caller.
pub(crate) fn caller_mentor(conn: &Connection, caller: &Caller) -> ServiceResult<Option<Mentor>> {
    match (caller.role, caller.emp_id.as_deref()) {
        (Role::Mentor, Some(emp_id)) => Ok(SqliteMentorRepository::new(conn).find_by_emp_id(emp_id)?),
        _ => Ok(None),
    }
}

/// Intern record linked to an INTERN caller.
pub(crate) fn caller_intern(conn: &Connection, caller: &Caller) -> ServiceResult<Option<Intern>> {
    match (caller.role, caller.emp_id.as_deref()) {
        (Role::Intern, Some(code)) => Ok(SqliteInternRepository::new(conn).find_by_code(code)?),
        _ => Ok(None),
    }
}

/// Resolves which interns and workflow records the caller may see.
pub(crate) fn resolve_scope(conn: &Connection, caller: &Caller) -> ServiceResult<Scope> {
    let scope = match caller.role {
        Role::Admin => Scope::All,
        Role::Employee => match &caller.emp_id {
            Some(emp_id) => Scope::ReferredBy(emp_id.clone()),
            None => Scope::Nothing,
        },
        Role::Mentor => match caller_mentor(conn, caller)? {
            Some(mentor) => Scope::Mentor(mentor.id),
            None => Scope::Nothing,
        },
        Role::Intern => match caller_intern(conn, caller)? {
            Some(intern) => Scope::Intern(intern.id),
            None => Scope::Nothing,
        },
    };
    Ok(scope)
}

/// Whether the scope covers an intern record itself.
pub(crate) fn intern_visible(conn: &Connection, scope: &Scope, intern: &Intern) -> ServiceResult<bool> {
    let visible = match scope {
        Scope::All => true,
        Scope::ReferredBy(emp_id) => intern.referred_by_emp_id == *emp_id,
        Scope::Mentor(mentor_id) => {
            SqliteAssignmentRepository::new(conn).is_active_pair(intern.id, *mentor_id)?
        }
        Scope::Intern(own) => *own == intern.id,
        Scope::Nothing => false,
    };
    Ok(visible)
}

pub(crate) fn ensure_intern_visible(
    conn: &Connection,
    scope: &Scope,
    intern: &Intern,
) -> ServiceResult<()> {
    if intern_visible(conn, scope, intern)? {
        Ok(())
    } else {
        Err(ServiceError::access_denied())
    }
}

pub(crate) fn ensure_record_visible(
    scope: &Scope,
    intern: &InternRef,
    mentor_id: MentorId,
) -> ServiceResult<()> {
    if scope.permits_record(intern, mentor_id) {
        Ok(())
    } else {
        Err(ServiceError::access_denied())
    }
}

/// Allows ADMIN, or the MENTOR owning `mentor_id`.
pub(crate) fn ensure_owning_mentor(
    conn: &Connection,
    caller: &Caller,
    mentor_id: MentorId,
) -> ServiceResult<()> {
    match caller.role {
        Role::Admin => Ok(()),
        Role::Mentor => match caller_mentor(conn, caller)? {
            Some(own) if own.id == mentor_id => Ok(()),
            _ => Err(ServiceError::access_denied()),
        },
        Role::Employee | Role::Intern => Err(ServiceError::insufficient_permissions()),
    }
}

/// Picks the mentor a new task, feedback entry or meeting belongs to.
///
/// - MENTOR: their own record, which must be actively assigned to the intern.
/// - ADMIN: `requested` if given (must be actively assigned), otherwise the
///   intern's active assignment.
pub(crate) fn resolve_acting_mentor(
    conn: &Connection,
    caller: &Caller,
    intern_id: InternId,
    requested: Option<MentorId>,
) -> ServiceResult<MentorId> {
    caller.require_any(&[Role::Admin, Role::Mentor])?;
    SqliteInternRepository::new(conn)
        .get_intern(intern_id)?
        .ok_or_else(|| ServiceError::not_found("Intern"))?;
    let assignments = SqliteAssignmentRepository::new(conn);

    let mentor_id = match caller.role {
        Role::Mentor => {
            caller_mentor(conn, caller)?
                .ok_or_else(|| ServiceError::not_found("Mentor profile"))?
                .id
        }
        _ => match requested {
            Some(mentor_id) => {
                SqliteMentorRepository::new(conn)
                    .get_mentor(mentor_id)?
                    .ok_or_else(|| ServiceError::not_found("Mentor"))?;
                mentor_id
            }
            None => {
                return assignments
                    .active_for_intern(intern_id)?
                    .map(|assignment| assignment.mentor_id)
                    .ok_or_else(|| {
                        ServiceError::NotFound(
                            "No active mentor assignment for this intern".to_string(),
                        )
                    });
            }
        },
    };

    if !assignments.is_active_pair(intern_id, mentor_id)? {
        return Err(ServiceError::Forbidden(
            "Intern not assigned to this mentor".to_string(),
        ));
    }
    Ok(mentor_id)
}
