//! Credential primitives: password hashing and bearer tokens.
//!
//! # Invariants
//! - Plain-text passwords and raw tokens are never logged.
//! - Token verification failures never reveal which check failed to callers.

mod password;
mod token;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenKeys, MIN_SECRET_BYTES};

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug)]
pub enum AuthError {
    /// Signing secret is too short to be accepted.
    WeakSecret(usize),
    /// Token is malformed, tampered with or uses an unexpected algorithm.
    InvalidToken,
    /// Token signature is valid but `exp` has passed.
    ExpiredToken,
    /// Token could not be produced.
    Encoding(String),
    /// Password hashing backend failure.
    Hash(String),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WeakSecret(len) => write!(
                f,
                "token secret must be at least {MIN_SECRET_BYTES} bytes, got {len}"
            ),
            Self::InvalidToken => write!(f, "invalid token"),
            Self::ExpiredToken => write!(f, "token expired"),
            Self::Encoding(message) => write!(f, "token encoding failed: {message}"),
            Self::Hash(message) => write!(f, "password hashing failed: {message}"),
        }
    }
}

impl Error for AuthError {}
