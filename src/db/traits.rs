//! Store traits for LMS.
//!
//! The domain services only see these traits. `Database` provides SQLite
//! implementations; tests may substitute their own.

use async_trait::async_trait;

use crate::audit::{LogEntry, NewLogEntry};
use crate::db::{NewUser, User, UserUpdate};
use crate::loan::{Loan, LoanQuery, LoanStatus, NewLoan};
use crate::Result;

/// User persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user. Fails with `Conflict` if the email is taken
    /// (case-insensitively).
    async fn create(&self, new_user: &NewUser) -> Result<User>;

    /// Get a user by ID.
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get a user by email (case-insensitive).
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Apply a partial update. Returns `None` if the user does not exist.
    async fn update(&self, id: i64, update: &UserUpdate) -> Result<Option<User>>;

    /// List all users by ID.
    async fn list(&self) -> Result<Vec<User>>;
}

/// Loan persistence.
#[async_trait]
pub trait LoanStore: Send + Sync {
    /// Create a pending loan.
    async fn create(&self, new_loan: &NewLoan) -> Result<Loan>;

    /// Get a loan by ID.
    async fn get_by_id(&self, id: i64) -> Result<Option<Loan>>;

    /// List loans matching the query.
    async fn query(&self, query: &LoanQuery) -> Result<Vec<Loan>>;

    /// Atomically move a loan from `expected` to `new`.
    ///
    /// Returns the updated loan, or `None` if no loan with that ID is
    /// currently in `expected`.
    async fn update_status_if(
        &self,
        id: i64,
        expected: LoanStatus,
        new: LoanStatus,
    ) -> Result<Option<Loan>>;

    /// Delete a loan. Returns false if it did not exist.
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// Append-only audit log persistence.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Append an entry.
    async fn append(&self, entry: &NewLogEntry) -> Result<LogEntry>;

    /// List all entries, newest first.
    async fn list(&self) -> Result<Vec<LogEntry>>;
}
