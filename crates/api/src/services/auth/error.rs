//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::email::MailError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] bazaar_core::EmailError),

    /// Blank display name.
    #[error("name is required")]
    InvalidName,

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// No account uses the given email.
    #[error("email not found")]
    EmailNotFound,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// No reset token is on file for the user.
    #[error("reset link is not valid")]
    ResetLinkInvalid,

    /// The reset token expired or does not match.
    #[error("reset link has expired")]
    ResetLinkExpired,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// The reset email could not be sent.
    #[error("mail error: {0}")]
    Mail(#[from] MailError),
}
