//! Authentication error types.

use thiserror::Error;

use thimble_core::EmailError;

use crate::db::RepositoryError;

/// Errors that can occur during authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password is wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User does not exist.
    #[error("user not found")]
    UserNotFound,

    /// Email is already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password does not meet requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Email format is invalid.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Token could not be issued or validated.
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Database error.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}
