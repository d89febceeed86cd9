//! User model for LMS.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// User entity representing a registered account.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Login email (unique, stored lowercase).
    pub email: String,
    /// Password hash (Argon2).
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Whether the email address has been verified.
    pub is_active: bool,
    /// Whether the user holds the admin role.
    pub is_admin: bool,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login email.
    pub email: String,
    /// Password hash (should be pre-hashed with Argon2).
    pub password_hash: String,
    /// Initial activation state (false for self-registration).
    pub is_active: bool,
    /// Admin flag (false for self-registration).
    pub is_admin: bool,
}

impl NewUser {
    /// Create an inactive, non-admin user.
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password_hash: password_hash.into(),
            is_active: false,
            is_admin: false,
        }
    }

    /// Mark the account as already active.
    pub fn active(mut self) -> Self {
        self.is_active = true;
        self
    }

    /// Grant the admin role.
    pub fn admin(mut self) -> Self {
        self.is_admin = true;
        self
    }
}

/// Partial update for an existing user.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// New password hash.
    pub password_hash: Option<String>,
    /// New active status.
    pub is_active: Option<bool>,
    /// New admin flag.
    pub is_admin: Option<bool>,
}

impl UserUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set new password hash.
    pub fn password_hash(mut self, password_hash: impl Into<String>) -> Self {
        self.password_hash = Some(password_hash.into());
        self
    }

    /// Set active status.
    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    /// Set admin flag.
    pub fn is_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = Some(is_admin);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.password_hash.is_none() && self.is_active.is_none() && self.is_admin.is_none()
    }
}
