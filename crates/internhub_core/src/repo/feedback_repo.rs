//! Feedback repository contracts and SQLite implementation.

use super::{
    count_to_u64, get_uuid, parse_parties, Page, PageRequest, Pagination, RepoError, RepoResult,
    Scope, SqlFilter, PARTY_COLUMNS_SQL,
};
use crate::model::feedback::{Feedback, FeedbackId};
use crate::model::intern::InternId;
use crate::model::mentor::MentorId;
use crate::model::WithParties;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const FEEDBACK_COLUMNS_SQL: &str = "f.id,
    f.intern_id,
    f.mentor_id,
    f.rating,
    f.communication,
    f.technical,
    f.teamwork,
    f.initiative,
    f.comments,
    f.created_at";

const FEEDBACK_FROM_SQL: &str = "FROM feedback f
JOIN interns i ON i.id = f.intern_id
JOIN mentors m ON m.id = f.mentor_id";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackListQuery {
    pub intern_id: Option<InternId>,
    pub mentor_id: Option<MentorId>,
}

pub trait FeedbackRepository {
    fn create_feedback(&self, feedback: &Feedback) -> RepoResult<FeedbackId>;
    fn get_feedback(&self, id: FeedbackId) -> RepoResult<Option<WithParties<Feedback>>>;
    /// Persists scores and comments.
    fn update_feedback(&self, feedback: &Feedback) -> RepoResult<()>;
    fn delete_feedback(&self, id: FeedbackId) -> RepoResult<()>;
    fn list_feedback(
        &self,
        query: &FeedbackListQuery,
        scope: &Scope,
        page: PageRequest,
    ) -> RepoResult<Page<WithParties<Feedback>>>;
    fn feedback_of_intern(
        &self,
        intern_id: InternId,
        mentor_id: Option<MentorId>,
    ) -> RepoResult<Vec<Feedback>>;
}

pub struct SqliteFeedbackRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFeedbackRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn select(
        &self,
        filter: &SqlFilter,
        tail: &str,
        values: Vec<Value>,
    ) -> RepoResult<Vec<WithParties<Feedback>>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {FEEDBACK_COLUMNS_SQL}, {PARTY_COLUMNS_SQL}
             {FEEDBACK_FROM_SQL}{}
             ORDER BY f.created_at DESC, f.rowid DESC{tail};",
            filter.where_sql()
        ))?;
        let mut rows = stmt.query(params_from_iter(values))?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            let (intern, mentor) = parse_parties(row)?;
            entries.push(WithParties {
                record: parse_feedback_row(row)?,
                intern,
                mentor,
            });
        }
        Ok(entries)
    }
}

impl FeedbackRepository for SqliteFeedbackRepository<'_> {
    fn create_feedback(&self, feedback: &Feedback) -> RepoResult<FeedbackId> {
        feedback.validate()?;

        self.conn.execute(
            "INSERT INTO feedback (
                id,
                intern_id,
                mentor_id,
                rating,
                communication,
                technical,
                teamwork,
                initiative,
                comments
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                feedback.id.to_string(),
                feedback.intern_id.to_string(),
                feedback.mentor_id.to_string(),
                feedback.rating,
                feedback.communication,
                feedback.technical,
                feedback.teamwork,
                feedback.initiative,
                feedback.comments.as_str(),
            ],
        )?;
        Ok(feedback.id)
    }

    fn get_feedback(&self, id: FeedbackId) -> RepoResult<Option<WithParties<Feedback>>> {
        let mut filter = SqlFilter::default();
        filter.push("f.id = ?", Value::Text(id.to_string()));
        Ok(self.select(&filter, "", filter.values())?.into_iter().next())
    }

    fn update_feedback(&self, feedback: &Feedback) -> RepoResult<()> {
        feedback.validate()?;

        let changed = self.conn.execute(
            "UPDATE feedback
             SET
                rating = ?1,
                communication = ?2,
                technical = ?3,
                teamwork = ?4,
                initiative = ?5,
                comments = ?6
             WHERE id = ?7;",
            params![
                feedback.rating,
                feedback.communication,
                feedback.technical,
                feedback.teamwork,
                feedback.initiative,
                feedback.comments.as_str(),
                feedback.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("Feedback", feedback.id));
        }
        Ok(())
    }

    fn delete_feedback(&self, id: FeedbackId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM feedback WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("Feedback", id));
        }
        Ok(())
    }

    fn list_feedback(
        &self,
        query: &FeedbackListQuery,
        scope: &Scope,
        page: PageRequest,
    ) -> RepoResult<Page<WithParties<Feedback>>> {
        let mut filter = SqlFilter::default();
        filter.push_scope(scope, "f.intern_id", Some("f.mentor_id"));
        if let Some(intern_id) = query.intern_id {
            filter.push("f.intern_id = ?", Value::Text(intern_id.to_string()));
        }
        if let Some(mentor_id) = query.mentor_id {
            filter.push("f.mentor_id = ?", Value::Text(mentor_id.to_string()));
        }

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) {FEEDBACK_FROM_SQL}{};", filter.where_sql()),
            params_from_iter(filter.values()),
            |row| row.get(0),
        )?;
        let items = self.select(&filter, " LIMIT ? OFFSET ?", filter.paged_values(page))?;

        Ok(Page {
            items,
            pagination: Pagination::new(page, count_to_u64(total)),
        })
    }

    fn feedback_of_intern(
        &self,
        intern_id: InternId,
        mentor_id: Option<MentorId>,
    ) -> RepoResult<Vec<Feedback>> {
        let mut filter = SqlFilter::default();
        filter.push("f.intern_id = ?", Value::Text(intern_id.to_string()));
        if let Some(mentor_id) = mentor_id {
            filter.push("f.mentor_id = ?", Value::Text(mentor_id.to_string()));
        }
        let entries = self.select(&filter, "", filter.values())?;
        Ok(entries.into_iter().map(|entry| entry.record).collect())
    }
}

fn parse_feedback_row(row: &Row<'_>) -> RepoResult<Feedback> {
    Ok(Feedback {
        id: get_uuid(row, "id")?,
        intern_id: get_uuid(row, "intern_id")?,
        mentor_id: get_uuid(row, "mentor_id")?,
        rating: row.get("rating")?,
        communication: row.get("communication")?,
        technical: row.get("technical")?,
        teamwork: row.get("teamwork")?,
        initiative: row.get("initiative")?,
        comments: row.get("comments")?,
        created_at: row.get("created_at")?,
    })
}
