//! Task repository contracts and SQLite implementation.

use super::{
    count_to_u64, get_enum, get_uuid, parse_parties, Page, PageRequest, Pagination, RepoError,
    RepoResult, Scope, SqlFilter, PARTY_COLUMNS_SQL,
};
use crate::model::intern::InternId;
use crate::model::mentor::MentorId;
use crate::model::task::{Task, TaskId, TaskPriority, TaskStatus};
use crate::model::WithParties;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const TASK_COLUMNS_SQL: &str = "t.id,
    t.intern_id,
    t.mentor_id,
    t.title,
    t.description,
    t.due_date,
    t.status,
    t.priority,
    t.created_at,
    t.updated_at";

const TASK_FROM_SQL: &str = "FROM tasks t
JOIN interns i ON i.id = t.intern_id
JOIN mentors m ON m.id = t.mentor_id";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListQuery {
    pub intern_id: Option<InternId>,
    pub mentor_id: Option<MentorId>,
    pub status: Option<TaskStatus>,
}

pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<WithParties<Task>>>;
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    fn list_tasks(
        &self,
        query: &TaskListQuery,
        scope: &Scope,
        page: PageRequest,
    ) -> RepoResult<Page<WithParties<Task>>>;
    /// Tasks of one intern, newest first, optionally limited to one mentor.
    fn tasks_of_intern(
        &self,
        intern_id: InternId,
        mentor_id: Option<MentorId>,
    ) -> RepoResult<Vec<Task>>;
}

pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn select(
        &self,
        filter: &SqlFilter,
        tail: &str,
        values: Vec<Value>,
    ) -> RepoResult<Vec<WithParties<Task>>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS_SQL}, {PARTY_COLUMNS_SQL}
             {TASK_FROM_SQL}{}
             ORDER BY t.created_at DESC, t.rowid DESC{tail};",
            filter.where_sql()
        ))?;
        let mut rows = stmt.query(params_from_iter(values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            let (intern, mentor) = parse_parties(row)?;
            tasks.push(WithParties {
                record: parse_task_row(row)?,
                intern,
                mentor,
            });
        }
        Ok(tasks)
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        self.conn.execute(
            "INSERT INTO tasks (
                id,
                intern_id,
                mentor_id,
                title,
                description,
                due_date,
                status,
                priority
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                task.id.to_string(),
                task.intern_id.to_string(),
                task.mentor_id.to_string(),
                task.title.as_str(),
                task.description.as_str(),
                task.due_date,
                task.status.as_str(),
                task.priority.as_str(),
            ],
        )?;
        Ok(task.id)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<WithParties<Task>>> {
        let mut filter = SqlFilter::default();
        filter.push("t.id = ?", Value::Text(id.to_string()));
        Ok(self.select(&filter, "", filter.values())?.into_iter().next())
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?1,
                description = ?2,
                due_date = ?3,
                status = ?4,
                priority = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?6;",
            params![
                task.title.as_str(),
                task.description.as_str(),
                task.due_date,
                task.status.as_str(),
                task.priority.as_str(),
                task.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("Task", task.id));
        }
        Ok(())
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("Task", id));
        }
        Ok(())
    }

    fn list_tasks(
        &self,
        query: &TaskListQuery,
        scope: &Scope,
        page: PageRequest,
    ) -> RepoResult<Page<WithParties<Task>>> {
        let mut filter = SqlFilter::default();
        filter.push_scope(scope, "t.intern_id", Some("t.mentor_id"));
        if let Some(intern_id) = query.intern_id {
            filter.push("t.intern_id = ?", Value::Text(intern_id.to_string()));
        }
        if let Some(mentor_id) = query.mentor_id {
            filter.push("t.mentor_id = ?", Value::Text(mentor_id.to_string()));
        }
        if let Some(status) = query.status {
            filter.push("t.status = ?", Value::Text(status.as_str().to_string()));
        }

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) {TASK_FROM_SQL}{};", filter.where_sql()),
            params_from_iter(filter.values()),
            |row| row.get(0),
        )?;
        let items = self.select(&filter, " LIMIT ? OFFSET ?", filter.paged_values(page))?;

        Ok(Page {
            items,
            pagination: Pagination::new(page, count_to_u64(total)),
        })
    }

    fn tasks_of_intern(
        &self,
        intern_id: InternId,
        mentor_id: Option<MentorId>,
    ) -> RepoResult<Vec<Task>> {
        let mut filter = SqlFilter::default();
        filter.push("t.intern_id = ?", Value::Text(intern_id.to_string()));
        if let Some(mentor_id) = mentor_id {
            filter.push("t.mentor_id = ?", Value::Text(mentor_id.to_string()));
        }
        let tasks = self.select(&filter, "", filter.values())?;
        Ok(tasks.into_iter().map(|task| task.record).collect())
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    Ok(Task {
        id: get_uuid(row, "id")?,
        intern_id: get_uuid(row, "intern_id")?,
        mentor_id: get_uuid(row, "mentor_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        due_date: row.get("due_date")?,
        status: get_enum(row, "status", TaskStatus::parse)?,
        priority: get_enum(row, "priority", TaskPriority::parse)?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
