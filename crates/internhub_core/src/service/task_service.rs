//! Task assignment and tracking.

use super::access::{self, Caller};
use super::{ServiceError, ServiceResult};
use crate::model::task::{NewTask, Task, TaskId, TaskPatch};
use crate::model::user::Role;
use crate::model::WithParties;
use crate::repo::task_repo::{SqliteTaskRepository, TaskListQuery, TaskRepository};
use crate::repo::{Page, PageRequest};
use rusqlite::Connection;

pub struct TaskService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> TaskService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn load(&self, id: TaskId) -> ServiceResult<WithParties<Task>> {
        SqliteTaskRepository::new(self.conn)
            .get_task(id)?
            .ok_or_else(|| ServiceError::not_found("Task"))
    }

    pub fn create(&self, caller: &Caller, input: NewTask) -> ServiceResult<WithParties<Task>> {
        let mentor_id = access::resolve_acting_mentor(self.conn, caller, input.intern_id, None)?;
        let task = Task::assign(mentor_id, input);
        SqliteTaskRepository::new(self.conn).create_task(&task)?;
        self.load(task.id)
    }

    pub fn list(
        &self,
        caller: &Caller,
        query: &TaskListQuery,
        page: PageRequest,
    ) -> ServiceResult<Page<WithParties<Task>>> {
        let scope = access::resolve_scope(self.conn, caller)?;
        Ok(SqliteTaskRepository::new(self.conn).list_tasks(query, &scope, page)?)
    }

    pub fn get(&self, caller: &Caller, id: TaskId) -> ServiceResult<WithParties<Task>> {
        let task = self.load(id)?;
        let scope = access::resolve_scope(self.conn, caller)?;
        access::ensure_record_visible(&scope, &task.intern, task.record.mentor_id)?;
        Ok(task)
    }

    /// ADMIN and the owning MENTOR edit freely; the INTERN may only move status.
    pub fn update(&self, caller: &Caller, id: TaskId, patch: TaskPatch) -> ServiceResult<WithParties<Task>> {
        let current = self.load(id)?;
        let patch = match caller.role {
            Role::Admin => patch,
            Role::Mentor => {
                access::ensure_owning_mentor(self.conn, caller, current.record.mentor_id)?;
                patch
            }
            Role::Intern => {
                let scope = access::resolve_scope(self.conn, caller)?;
                access::ensure_record_visible(&scope, &current.intern, current.record.mentor_id)?;
                patch.status_only()
            }
            Role::Employee => return Err(ServiceError::insufficient_permissions()),
        };

        let mut task = current.record;
        task.apply_patch(patch);
        SqliteTaskRepository::new(self.conn).update_task(&task)?;
        self.load(id)
    }

    pub fn delete(&self, caller: &Caller, id: TaskId) -> ServiceResult<()> {
        caller.require_any(&[Role::Admin, Role::Mentor])?;
        let task = self.load(id)?;
        access::ensure_owning_mentor(self.conn, caller, task.record.mentor_id)?;
        Ok(SqliteTaskRepository::new(self.conn).delete_task(id)?)
    }
}
