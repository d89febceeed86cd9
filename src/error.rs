//! Error types for LMS.

use thiserror::Error;

use crate::auth::{AuthError, PasswordError};

/// Common error type for LMS.
#[derive(Error, Debug)]
pub enum LmsError {
    /// Bad credentials or a failed token check.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Valid identity, insufficient role.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource absent, or hidden from the requester.
    #[error("{0} not found")]
    NotFound(String),

    /// State-machine violation or duplicate unique key.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Token validation failed.
    #[error("token error: {0}")]
    Token(#[from] AuthError),

    /// Password hashing or validation failed.
    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    /// Database error.
    ///
    /// Database errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Outbound mail could not be built or delivered.
    #[error("mail error: {0}")]
    Mail(String),

    /// Unexpected internal failure (e.g. token signing).
    #[error("internal error: {0}")]
    Internal(String),
}

// Conversion from sqlx errors
impl From<sqlx::Error> for LmsError {
    fn from(e: sqlx::Error) -> Self {
        LmsError::Database(e.to_string())
    }
}

/// Result type alias for LMS operations.
pub type Result<T> = std::result::Result<T, LmsError>;
