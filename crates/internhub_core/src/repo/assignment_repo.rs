//! Assignment repository: which intern is mentored by whom.
//!
//! # Invariants
//! - At most one active row per intern; services check before activating.
//! - A `(intern, mentor)` pair owns one row that is reactivated on reuse.

use super::intern_repo::parse_intern_row;
use super::{bool_to_int, get_bool, get_uuid, RepoError, RepoResult};
use crate::model::assignment::{Assignment, AssignmentId};
use crate::model::intern::{Intern, InternId};
use crate::model::mentor::MentorId;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ASSIGNMENT_SELECT_SQL: &str = "SELECT
    id,
    intern_id,
    mentor_id,
    department,
    assigned_at,
    is_active
FROM assignments";

/// An actively assigned intern with the time the pairing started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignedIntern {
    pub intern: Intern,
    pub assigned_at: i64,
}

pub trait AssignmentRepository {
    fn create_assignment(&self, assignment: &Assignment) -> RepoResult<AssignmentId>;
    fn active_for_intern(&self, intern_id: InternId) -> RepoResult<Option<Assignment>>;
    fn find_pair(&self, intern_id: InternId, mentor_id: MentorId)
        -> RepoResult<Option<Assignment>>;
    /// Marks an existing row active again with a fresh `assigned_at`.
    fn reactivate(&self, id: AssignmentId, department: &str) -> RepoResult<()>;
    fn deactivate(&self, id: AssignmentId) -> RepoResult<()>;
    fn count_active_for_mentor(&self, mentor_id: MentorId) -> RepoResult<u32>;
    fn is_active_pair(&self, intern_id: InternId, mentor_id: MentorId) -> RepoResult<bool>;
    /// Actively assigned interns of a mentor, earliest assignment first.
    fn active_interns_of(&self, mentor_id: MentorId) -> RepoResult<Vec<AssignedIntern>>;
}

pub struct SqliteAssignmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAssignmentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn set_active(&self, id: AssignmentId, active: bool, department: Option<&str>) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE assignments
             SET
                is_active = ?1,
                department = COALESCE(?2, department),
                assigned_at = CASE WHEN ?1 = 1
                    THEN (strftime('%s', 'now') * 1000)
                    ELSE assigned_at END
             WHERE id = ?3;",
            params![bool_to_int(active), department, id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("Assignment", id));
        }
        Ok(())
    }
}

impl AssignmentRepository for SqliteAssignmentRepository<'_> {
    fn create_assignment(&self, assignment: &Assignment) -> RepoResult<AssignmentId> {
        self.conn.execute(
            "INSERT INTO assignments (id, intern_id, mentor_id, department, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                assignment.id.to_string(),
                assignment.intern_id.to_string(),
                assignment.mentor_id.to_string(),
                assignment.department.as_str(),
                bool_to_int(assignment.is_active),
            ],
        )?;
        Ok(assignment.id)
    }

    fn active_for_intern(&self, intern_id: InternId) -> RepoResult<Option<Assignment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ASSIGNMENT_SELECT_SQL}
             WHERE intern_id = ?1 AND is_active = 1
             ORDER BY assigned_at DESC
             LIMIT 1;"
        ))?;
        let row = stmt
            .query_row([intern_id.to_string()], |row| Ok(parse_assignment_row(row)))
            .optional()?;
        row.transpose()
    }

    fn find_pair(
        &self,
        intern_id: InternId,
        mentor_id: MentorId,
    ) -> RepoResult<Option<Assignment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ASSIGNMENT_SELECT_SQL} WHERE intern_id = ?1 AND mentor_id = ?2;"
        ))?;
        let row = stmt
            .query_row(
                params![intern_id.to_string(), mentor_id.to_string()],
                |row| Ok(parse_assignment_row(row)),
            )
            .optional()?;
        row.transpose()
    }

    fn reactivate(&self, id: AssignmentId, department: &str) -> RepoResult<()> {
        self.set_active(id, true, Some(department))
    }

    fn deactivate(&self, id: AssignmentId) -> RepoResult<()> {
        self.set_active(id, false, None)
    }

    fn count_active_for_mentor(&self, mentor_id: MentorId) -> RepoResult<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM assignments WHERE mentor_id = ?1 AND is_active = 1;",
            [mentor_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn is_active_pair(&self, intern_id: InternId, mentor_id: MentorId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS (
                SELECT 1 FROM assignments
                WHERE intern_id = ?1 AND mentor_id = ?2 AND is_active = 1
             );",
            params![intern_id.to_string(), mentor_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn active_interns_of(&self, mentor_id: MentorId) -> RepoResult<Vec<AssignedIntern>> {
        let mut stmt = self.conn.prepare(
            "SELECT i.*, a.assigned_at AS assigned_at
             FROM assignments a
             JOIN interns i ON i.id = a.intern_id
             WHERE a.mentor_id = ?1 AND a.is_active = 1
             ORDER BY a.assigned_at DESC, i.intern_code ASC;",
        )?;
        let mut rows = stmt.query([mentor_id.to_string()])?;
        let mut interns = Vec::new();
        while let Some(row) = rows.next()? {
            interns.push(AssignedIntern {
                intern: parse_intern_row(row)?,
                assigned_at: row.get("assigned_at")?,
            });
        }
        Ok(interns)
    }
}

fn parse_assignment_row(row: &Row<'_>) -> RepoResult<Assignment> {
    Ok(Assignment {
        id: get_uuid(row, "id")?,
        intern_id: get_uuid(row, "intern_id")?,
        mentor_id: get_uuid(row, "mentor_id")?,
        department: row.get("department")?,
        assigned_at: row.get("assigned_at")?,
        is_active: get_bool(row, "is_active")?,
    })
}
