//! Meeting repository contracts and SQLite implementation.

use super::{
    count_to_u64, get_enum, get_uuid, parse_parties, Page, PageRequest, Pagination, RepoError,
    RepoResult, Scope, SqlFilter, PARTY_COLUMNS_SQL,
};
use crate::model::intern::InternId;
use crate::model::meeting::{Meeting, MeetingId, MeetingKind, MeetingStatus};
use crate::model::mentor::MentorId;
use crate::model::WithParties;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const MEETING_COLUMNS_SQL: &str = "mt.id,
    mt.intern_id,
    mt.mentor_id,
    mt.title,
    mt.date,
    mt.time,
    mt.kind,
    mt.status,
    mt.agenda,
    mt.notes,
    mt.created_at";

const MEETING_FROM_SQL: &str = "FROM meetings mt
JOIN interns i ON i.id = mt.intern_id
JOIN mentors m ON m.id = mt.mentor_id";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeetingListQuery {
    pub intern_id: Option<InternId>,
    pub mentor_id: Option<MentorId>,
    pub status: Option<MeetingStatus>,
}

pub trait MeetingRepository {
    fn create_meeting(&self, meeting: &Meeting) -> RepoResult<MeetingId>;
    fn get_meeting(&self, id: MeetingId) -> RepoResult<Option<WithParties<Meeting>>>;
    fn update_meeting(&self, meeting: &Meeting) -> RepoResult<()>;
    fn delete_meeting(&self, id: MeetingId) -> RepoResult<()>;
    /// Latest meeting date first.
    fn list_meetings(
        &self,
        query: &MeetingListQuery,
        scope: &Scope,
        page: PageRequest,
    ) -> RepoResult<Page<WithParties<Meeting>>>;
    fn meetings_of_intern(
        &self,
        intern_id: InternId,
        mentor_id: Option<MentorId>,
    ) -> RepoResult<Vec<Meeting>>;
}

pub struct SqliteMeetingRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMeetingRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn select(
        &self,
        filter: &SqlFilter,
        tail: &str,
        values: Vec<Value>,
    ) -> RepoResult<Vec<WithParties<Meeting>>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MEETING_COLUMNS_SQL}, {PARTY_COLUMNS_SQL}
             {MEETING_FROM_SQL}{}
             ORDER BY mt.date DESC, mt.time DESC, mt.rowid DESC{tail};",
            filter.where_sql()
        ))?;
        let mut rows = stmt.query(params_from_iter(values))?;
        let mut meetings = Vec::new();
        while let Some(row) = rows.next()? {
            let (intern, mentor) = parse_parties(row)?;
            meetings.push(WithParties {
                record: parse_meeting_row(row)?,
                intern,
                mentor,
            });
        }
        Ok(meetings)
    }
}

impl MeetingRepository for SqliteMeetingRepository<'_> {
    fn create_meeting(&self, meeting: &Meeting) -> RepoResult<MeetingId> {
        meeting.validate()?;

        self.conn.execute(
            "INSERT INTO meetings (
                id,
                intern_id,
                mentor_id,
                title,
                date,
                time,
                kind,
                status,
                agenda,
                notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                meeting.id.to_string(),
                meeting.intern_id.to_string(),
                meeting.mentor_id.to_string(),
                meeting.title.as_str(),
                meeting.date,
                meeting.time.as_str(),
                meeting.kind.as_str(),
                meeting.status.as_str(),
                meeting.agenda.as_deref(),
                meeting.notes.as_deref(),
            ],
        )?;
        Ok(meeting.id)
    }

    fn get_meeting(&self, id: MeetingId) -> RepoResult<Option<WithParties<Meeting>>> {
        let mut filter = SqlFilter::default();
        filter.push("mt.id = ?", Value::Text(id.to_string()));
        Ok(self.select(&filter, "", filter.values())?.into_iter().next())
    }

    fn update_meeting(&self, meeting: &Meeting) -> RepoResult<()> {
        meeting.validate()?;

        let changed = self.conn.execute(
            "UPDATE meetings
             SET
                title = ?1,
                date = ?2,
                time = ?3,
                kind = ?4,
                status = ?5,
                agenda = ?6,
                notes = ?7
             WHERE id = ?8;",
            params![
                meeting.title.as_str(),
                meeting.date,
                meeting.time.as_str(),
                meeting.kind.as_str(),
                meeting.status.as_str(),
                meeting.agenda.as_deref(),
                meeting.notes.as_deref(),
                meeting.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("Meeting", meeting.id));
        }
        Ok(())
    }

    fn delete_meeting(&self, id: MeetingId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM meetings WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("Meeting", id));
        }
        Ok(())
    }

    fn list_meetings(
        &self,
        query: &MeetingListQuery,
        scope: &Scope,
        page: PageRequest,
    ) -> RepoResult<Page<WithParties<Meeting>>> {
        let mut filter = SqlFilter::default();
        filter.push_scope(scope, "mt.intern_id", Some("mt.mentor_id"));
        if let Some(intern_id) = query.intern_id {
            filter.push("mt.intern_id = ?", Value::Text(intern_id.to_string()));
        }
        if let Some(mentor_id) = query.mentor_id {
            filter.push("mt.mentor_id = ?", Value::Text(mentor_id.to_string()));
        }
        if let Some(status) = query.status {
            filter.push("mt.status = ?", Value::Text(status.as_str().to_string()));
        }

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) {MEETING_FROM_SQL}{};", filter.where_sql()),
            params_from_iter(filter.values()),
            |row| row.get(0),
        )?;
        let items = self.select(&filter, " LIMIT ? OFFSET ?", filter.paged_values(page))?;

        Ok(Page {
            items,
            pagination: Pagination::new(page, count_to_u64(total)),
        })
    }

    fn meetings_of_intern(
        &self,
        intern_id: InternId,
        mentor_id: Option<MentorId>,
    ) -> RepoResult<Vec<Meeting>> {
        let mut filter = SqlFilter::default();
        filter.push("mt.intern_id = ?", Value::Text(intern_id.to_string()));
        if let Some(mentor_id) = mentor_id {
            filter.push("mt.mentor_id = ?", Value::Text(mentor_id.to_string()));
        }
        let meetings = self.select(&filter, "", filter.values())?;
        Ok(meetings.into_iter().map(|meeting| meeting.record).collect())
    }
}

fn parse_meeting_row(row: &Row<'_>) -> RepoResult<Meeting> {
    Ok(Meeting {
        id: get_uuid(row, "id")?,
        intern_id: get_uuid(row, "intern_id")?,
        mentor_id: get_uuid(row, "mentor_id")?,
        title: row.get("title")?,
        date: row.get("date")?,
        time: row.get("time")?,
        kind: get_enum(row, "kind", MeetingKind::parse)?,
        status: get_enum(row, "status", MeetingStatus::parse)?,
        agenda: row.get("agenda")?,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
    })
}
