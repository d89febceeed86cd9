//! Audit log entry types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Category of an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    UserRegistration,
    EmailVerification,
    LoginAttempt,
    PasswordResetRequest,
    PasswordResetCompletion,
    LoanSubmission,
    LoanStatusUpdate,
    LoanDeletion,
}

impl LogCategory {
    /// All categories, in lifecycle order.
    pub const ALL: [LogCategory; 8] = [
        LogCategory::UserRegistration,
        LogCategory::EmailVerification,
        LogCategory::LoginAttempt,
        LogCategory::PasswordResetRequest,
        LogCategory::PasswordResetCompletion,
        LogCategory::LoanSubmission,
        LogCategory::LoanStatusUpdate,
        LogCategory::LoanDeletion,
    ];

    /// Display label, which is also the stored value.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogCategory::UserRegistration => "User Registration",
            LogCategory::EmailVerification => "Email Verification",
            LogCategory::LoginAttempt => "Login Attempt",
            LogCategory::PasswordResetRequest => "Password Reset Request",
            LogCategory::PasswordResetCompletion => "Password Reset Completion",
            LogCategory::LoanSubmission => "Loan Application Submission",
            LogCategory::LoanStatusUpdate => "Loan Application Status Update",
            LogCategory::LoanDeletion => "Loan Deletion",
        }
    }
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown log category: {s}"))
    }
}

impl TryFrom<String> for LogCategory {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Serialize for LogCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A recorded audit event.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LogEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    pub category: LogCategory,
    pub message: String,
}

/// Data for appending an audit event.
#[derive(Debug, Clone)]
pub struct NewLogEntry {
    pub timestamp: DateTime<Utc>,
    pub category: LogCategory,
    pub message: String,
}

impl NewLogEntry {
    /// Create an entry stamped with the current time.
    pub fn new(category: LogCategory, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            category,
            message: message.into(),
        }
    }
}
