//! HTTP handlers.

pub mod admin;
pub mod loans;
pub mod users;

pub use admin::*;
pub use loans::*;
pub use users::*;

use std::sync::Arc;

use crate::account::AccountService;
use crate::audit::{AuditLog, LogRepository};
use crate::auth::TokenEngine;
use crate::config::AuthConfig;
use crate::db::{Database, UserRepository};
use crate::loan::{LoanRepository, LoanService};
use crate::mail::Mailer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub loans: LoanService,
    pub audit: AuditLog,
    pub tokens: Arc<TokenEngine>,
}

impl AppState {
    /// Wire the services over SQLite stores.
    pub fn new(db: &Database, tokens: Arc<TokenEngine>, mailer: Mailer, auth: &AuthConfig) -> Self {
        let pool = db.pool().clone();
        let audit = AuditLog::new(Arc::new(LogRepository::new(pool.clone())));

        let accounts = AccountService::new(
            Arc::new(UserRepository::new(pool.clone())),
            Arc::clone(&tokens),
            mailer,
            audit.clone(),
        )
        .with_ttls(auth.access_ttl(), auth.refresh_ttl());

        let loans = LoanService::new(Arc::new(LoanRepository::new(pool)), audit.clone());

        Self {
            accounts,
            loans,
            audit,
            tokens,
        }
    }
}
