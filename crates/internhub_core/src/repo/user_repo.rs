//! Login account persistence.

use super::{bool_to_int, get_bool, get_enum, get_uuid, RepoError, RepoResult};
use crate::model::user::{Role, User, UserId};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    username,
    password_hash,
    role,
    emp_id,
    name,
    email,
    phone,
    department,
    is_first_login,
    created_at,
    updated_at
FROM users";

pub trait UserRepository {
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Looks an account up by username or employee id.
    fn find_by_login(&self, login: &str) -> RepoResult<Option<User>>;
    fn update_password(&self, id: UserId, password_hash: &str) -> RepoResult<()>;
}

pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        self.conn.execute(
            "INSERT INTO users (
                id,
                username,
                password_hash,
                role,
                emp_id,
                name,
                email,
                phone,
                department,
                is_first_login
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                user.id.to_string(),
                user.username.as_str(),
                user.password_hash.as_str(),
                user.role.as_str(),
                user.emp_id.as_deref(),
                user.name.as_str(),
                user.email.as_deref(),
                user.phone.as_deref(),
                user.department.as_deref(),
                bool_to_int(user.is_first_login),
            ],
        )?;
        Ok(user.id)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let row = stmt
            .query_row([id.to_string()], |row| Ok(parse_user_row(row)))
            .optional()?;
        row.transpose()
    }

    fn find_by_login(&self, login: &str) -> RepoResult<Option<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL}
             WHERE username = ?1 OR emp_id = ?1
             ORDER BY CASE WHEN username = ?1 THEN 0 ELSE 1 END
             LIMIT 1;"
        ))?;
        let row = stmt
            .query_row([login], |row| Ok(parse_user_row(row)))
            .optional()?;
        row.transpose()
    }

    fn update_password(&self, id: UserId, password_hash: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE users
             SET
                password_hash = ?1,
                is_first_login = 0,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
            params![password_hash, id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("User", id));
        }
        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        id: get_uuid(row, "id")?,
        username: row.get("username")?,
        password_hash: row.get("password_hash")?,
        role: get_enum(row, "role", Role::parse)?,
        emp_id: row.get("emp_id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        department: row.get("department")?,
        is_first_login: get_bool(row, "is_first_login")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
