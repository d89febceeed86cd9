//! Audit log for LMS.
//!
//! Account and loan operations append an entry here as a side effect.
//! Recording is best-effort: a failing store never fails the operation
//! that triggered it.

mod repository;
mod types;

pub use repository::LogRepository;
pub use types::{LogCategory, LogEntry, NewLogEntry};

use std::sync::Arc;

use tracing::warn;

use crate::auth::Identity;
use crate::db::AuditStore;
use crate::Result;

/// Audit log service.
#[derive(Clone)]
pub struct AuditLog {
    store: Arc<dyn AuditStore>,
}

impl AuditLog {
    /// Create a new audit log over the given store.
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Record an event, swallowing store failures.
    pub async fn record(&self, category: LogCategory, message: impl Into<String>) {
        let entry = NewLogEntry::new(category, message);
        if let Err(e) = self.store.append(&entry).await {
            warn!(category = %category, error = %e, "Failed to write audit log entry");
        }
    }

    /// List all entries, newest first. Admin only.
    pub async fn list(&self, identity: &Identity) -> Result<Vec<LogEntry>> {
        identity.require_admin()?;
        self.store.list().await
    }
}
