//! Mentor repository contracts and SQLite implementation.

use super::{count_to_u64, get_enum, get_uuid, RepoError, RepoResult};
use crate::model::mentor::{InternDuration, Mentor, MentorAvailability, MentorId};
use rusqlite::{params, Connection, OptionalExtension, Row};

const MENTOR_SELECT_SQL: &str = "SELECT
    id,
    emp_id,
    name,
    department,
    email,
    phone,
    availability,
    experience,
    max_capacity,
    current_interns,
    created_at,
    updated_at
FROM mentors";

pub trait MentorRepository {
    fn create_mentor(&self, mentor: &Mentor) -> RepoResult<MentorId>;
    fn get_mentor(&self, id: MentorId) -> RepoResult<Option<Mentor>>;
    fn find_by_emp_id(&self, emp_id: &str) -> RepoResult<Option<Mentor>>;
    /// Persists every mutable field, including load and availability.
    fn update_mentor(&self, mentor: &Mentor) -> RepoResult<()>;
    fn delete_mentor(&self, id: MentorId) -> RepoResult<()>;
    /// Mentors sorted by name, optionally restricted to one department.
    fn list_mentors(&self, department: Option<&str>) -> RepoResult<Vec<Mentor>>;
    /// Number of tasks, projects, feedback entries and meetings owned by the mentor.
    fn history_count(&self, id: MentorId) -> RepoResult<u64>;
    fn active_intern_durations(&self, id: MentorId) -> RepoResult<Vec<InternDuration>>;
}

pub struct SqliteMentorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMentorRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_one(&self, column: &str, value: String) -> RepoResult<Option<Mentor>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MENTOR_SELECT_SQL} WHERE {column} = ?1;"))?;
        let row = stmt
            .query_row([value], |row| Ok(parse_mentor_row(row)))
            .optional()?;
        row.transpose()
    }
}

impl MentorRepository for SqliteMentorRepository<'_> {
    fn create_mentor(&self, mentor: &Mentor) -> RepoResult<MentorId> {
        mentor.validate()?;

        self.conn.execute(
            "INSERT INTO mentors (
                id,
                emp_id,
                name,
                department,
                email,
                phone,
                availability,
                experience,
                max_capacity,
                current_interns
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                mentor.id.to_string(),
                mentor.emp_id.as_str(),
                mentor.name.as_str(),
                mentor.department.as_str(),
                mentor.email.as_str(),
                mentor.phone.as_deref(),
                mentor.availability.as_str(),
                mentor.experience.as_deref(),
                mentor.max_capacity,
                mentor.current_interns,
            ],
        )?;
        Ok(mentor.id)
    }

    fn get_mentor(&self, id: MentorId) -> RepoResult<Option<Mentor>> {
        self.query_one("id", id.to_string())
    }

    fn find_by_emp_id(&self, emp_id: &str) -> RepoResult<Option<Mentor>> {
        self.query_one("emp_id", emp_id.to_string())
    }

    fn update_mentor(&self, mentor: &Mentor) -> RepoResult<()> {
        mentor.validate()?;

        let changed = self.conn.execute(
            "UPDATE mentors
             SET
                name = ?1,
                department = ?2,
                email = ?3,
                phone = ?4,
                availability = ?5,
                experience = ?6,
                max_capacity = ?7,
                current_interns = ?8,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?9;",
            params![
                mentor.name.as_str(),
                mentor.department.as_str(),
                mentor.email.as_str(),
                mentor.phone.as_deref(),
                mentor.availability.as_str(),
                mentor.experience.as_deref(),
                mentor.max_capacity,
                mentor.current_interns,
                mentor.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("Mentor", mentor.id));
        }
        Ok(())
    }

    fn delete_mentor(&self, id: MentorId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM mentors WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("Mentor", id));
        }
        Ok(())
    }

    fn list_mentors(&self, department: Option<&str>) -> RepoResult<Vec<Mentor>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MENTOR_SELECT_SQL}
             WHERE (?1 IS NULL OR department = ?1)
             ORDER BY name ASC, emp_id ASC;"
        ))?;
        let mut rows = stmt.query([department])?;
        let mut mentors = Vec::new();
        while let Some(row) = rows.next()? {
            mentors.push(parse_mentor_row(row)?);
        }
        Ok(mentors)
    }

    fn history_count(&self, id: MentorId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM tasks WHERE mentor_id = ?1)
                + (SELECT COUNT(*) FROM projects WHERE mentor_id = ?1)
                + (SELECT COUNT(*) FROM feedback WHERE mentor_id = ?1)
                + (SELECT COUNT(*) FROM meetings WHERE mentor_id = ?1);",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count_to_u64(count))
    }

    fn active_intern_durations(&self, id: MentorId) -> RepoResult<Vec<InternDuration>> {
        let mut stmt = self.conn.prepare(
            "SELECT i.name, i.intern_code, i.start_date, i.end_date
             FROM assignments a
             JOIN interns i ON i.id = a.intern_id
             WHERE a.mentor_id = ?1 AND a.is_active = 1
             ORDER BY i.start_date ASC, i.intern_code ASC;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        let mut durations = Vec::new();
        while let Some(row) = rows.next()? {
            durations.push(InternDuration {
                intern_name: row.get("name")?,
                intern_code: row.get("intern_code")?,
                start_date: row.get("start_date")?,
                end_date: row.get("end_date")?,
            });
        }
        Ok(durations)
    }
}

pub(crate) fn parse_mentor_row(row: &Row<'_>) -> RepoResult<Mentor> {
    Ok(Mentor {
        id: get_uuid(row, "id")?,
        emp_id: row.get("emp_id")?,
        name: row.get("name")?,
        department: row.get("department")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        availability: get_enum(row, "availability", MentorAvailability::parse)?,
        experience: row.get("experience")?,
        max_capacity: row.get("max_capacity")?,
        current_interns: row.get("current_interns")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
