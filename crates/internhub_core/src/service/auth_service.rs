//! Account login, token resolution and password management.

use super::access::Caller;
use super::{ServiceError, ServiceResult};
use crate::auth::{hash_password, verify_password, TokenKeys};
use crate::model::user::{validate_password, NewUser, User};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use chrono::Utc;
use log::{info, warn};
use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

/// Successful login: bearer token plus the account profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub user: User,
}

pub struct AuthService<'conn> {
    conn: &'conn Connection,
    keys: &'conn TokenKeys,
}

impl<'conn> AuthService<'conn> {
    pub fn new(conn: &'conn Connection, keys: &'conn TokenKeys) -> Self {
        Self { conn, keys }
    }

    fn users(&self) -> SqliteUserRepository<'conn> {
        SqliteUserRepository::new(self.conn)
    }

    /// Authenticates by username or employee id.
    pub fn login(&self, login: &str, password: &str) -> ServiceResult<LoginResult> {
        let invalid = || ServiceError::Unauthorized("Invalid credentials".to_string());
        let user = self.users().find_by_login(login.trim())?.ok_or_else(invalid)?;
        if !verify_password(password, &user.password_hash) {
            warn!("event=auth_login module=service status=rejected");
            return Err(invalid());
        }

        let token = self.keys.issue(&user, Utc::now().timestamp())?;
        info!(
            "event=auth_login module=service status=ok role={}",
            user.role
        );
        Ok(LoginResult { token, user })
    }

    /// Resolves a bearer token to a caller, reloading the account.
    pub fn authenticate(&self, token: &str) -> ServiceResult<Caller> {
        let claims = self.keys.decode(token)?;
        let user = self
            .users()
            .get_user(claims.sub)?
            .ok_or_else(|| ServiceError::Unauthorized("User no longer exists".to_string()))?;
        Ok(Caller::from_user(&user))
    }

    pub fn logout(&self, caller: &Caller) {
        info!(
            "event=auth_logout module=service status=ok role={}",
            caller.role
        );
    }

    pub fn me(&self, caller: &Caller) -> ServiceResult<User> {
        self.users()
            .get_user(caller.user_id)?
            .ok_or_else(|| ServiceError::not_found("User"))
    }

    /// Replaces the caller's password and clears the first-login flag.
    pub fn reset_password(
        &self,
        caller: &Caller,
        current_password: &str,
        new_password: &str,
    ) -> ServiceResult<()> {
        let user = self.me(caller)?;
        if !verify_password(current_password, &user.password_hash) {
            return Err(ServiceError::invalid_state("Current password is incorrect"));
        }
        validate_password("newPassword", new_password)?;

        let hash = hash_password(new_password)?;
        self.users().update_password(user.id, &hash)?;
        info!("event=auth_password_reset module=service status=ok");
        Ok(())
    }

    /// Provisions an account; duplicate usernames or employee ids conflict.
    pub fn create_user(&self, input: NewUser) -> ServiceResult<User> {
        let input = input.normalized();
        input.validate()?;

        let user = User {
            id: Uuid::new_v4(),
            username: input.username,
            password_hash: hash_password(&input.password)?,
            role: input.role,
            emp_id: input.emp_id,
            name: input.name,
            email: input.email,
            phone: input.phone,
            department: input.department,
            is_first_login: true,
            created_at: 0,
            updated_at: 0,
        };
        self.users().create_user(&user).map_err(|err| match ServiceError::from(err) {
            ServiceError::Conflict(_) => {
                ServiceError::Conflict("Username or employee id already exists".to_string())
            }
            other => other,
        })?;
        info!(
            "event=user_create module=service status=ok role={}",
            user.role
        );

        self.users()
            .get_user(user.id)?
            .ok_or_else(|| ServiceError::Internal("created user not found in read-back".to_string()))
    }
}
