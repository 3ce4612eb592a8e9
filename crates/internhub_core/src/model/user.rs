//! Login accounts and roles.
//!
//! # Invariants
//! - `password_hash` is an argon2 PHC string and never leaves the process in
//!   serialized form.
//! - `emp_id` links a MENTOR to `mentors.emp_id`, an INTERN to
//!   `interns.intern_code` and an EMPLOYEE to `interns.referred_by_emp_id`.

use super::{clean_optional, require_email, require_min_chars, require_text, ValidationResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

/// Minimum accepted password length for new and reset passwords.
pub const MIN_PASSWORD_CHARS: usize = 8;

text_enum! {
    /// Access role carried by every account and every issued token.
    pub enum Role {
        Admin => "ADMIN",
        Employee => "EMPLOYEE",
        Mentor => "MENTOR",
        Intern => "INTERN",
    }
}

/// Persisted login account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub emp_id: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub is_first_login: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Input for provisioning a new account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub emp_id: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
}

impl NewUser {
    /// Trims text fields and lowercases the e-mail address.
    pub fn normalized(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            password: self.password,
            role: self.role,
            emp_id: clean_optional(self.emp_id),
            name: self.name.trim().to_string(),
            email: clean_optional(self.email).map(|email| email.to_lowercase()),
            phone: clean_optional(self.phone),
            department: clean_optional(self.department),
        }
    }

    pub fn validate(&self) -> ValidationResult {
        require_text("username", &self.username)?;
        validate_password("password", &self.password)?;
        require_min_chars("name", &self.name, 2)?;
        if let Some(email) = &self.email {
            require_email("email", email)?;
        }
        if self.role != Role::Admin && self.emp_id.is_none() {
            return Err(super::ValidationError::new(
                "empId",
                "is required for non-admin accounts",
            ));
        }
        Ok(())
    }
}

pub(crate) fn validate_password(field: &'static str, password: &str) -> ValidationResult {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(super::ValidationError::new(
            field,
            format!("must be at least {MIN_PASSWORD_CHARS} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{NewUser, Role};

    fn mentor_account() -> NewUser {
        NewUser {
            username: " EMP010 ".to_string(),
            password: "password123".to_string(),
            role: Role::Mentor,
            emp_id: Some("EMP010".to_string()),
            name: "Anita Rao".to_string(),
            email: Some(" Anita.Rao@Example.COM ".to_string()),
            phone: None,
            department: Some("  ".to_string()),
        }
    }

    #[test]
    fn role_names_round_trip_through_storage_text() {
        for role in [Role::Admin, Role::Employee, Role::Mentor, Role::Intern] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("admin"), None);
    }

    #[test]
    fn normalized_trims_and_lowercases() {
        let user = mentor_account().normalized();
        assert_eq!(user.username, "EMP010");
        assert_eq!(user.email.as_deref(), Some("anita.rao@example.com"));
        assert_eq!(user.department, None);
        assert!(user.validate().is_ok());
    }

    #[test]
    fn non_admin_accounts_need_an_employee_id() {
        let mut user = mentor_account();
        user.emp_id = None;
        let err = user.validate().unwrap_err();
        assert_eq!(err.field, "empId");
    }

    #[test]
    fn short_passwords_are_rejected() {
        let mut user = mentor_account();
        user.password = "short".to_string();
        assert_eq!(user.validate().unwrap_err().field, "password");
    }
}
