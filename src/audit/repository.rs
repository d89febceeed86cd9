//! Audit log repository for LMS.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::types::{LogEntry, NewLogEntry};
use crate::db::AuditStore;
use crate::{LmsError, Result};

/// SQLite-backed audit store.
#[derive(Clone)]
pub struct LogRepository {
    pool: SqlitePool,
}

impl LogRepository {
    /// Create a new LogRepository over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for LogRepository {
    async fn append(&self, entry: &NewLogEntry) -> Result<LogEntry> {
        let entry = sqlx::query_as::<_, LogEntry>(
            "INSERT INTO system_logs (timestamp, category, message)
             VALUES (?, ?, ?) RETURNING id, timestamp, category, message",
        )
        .bind(entry.timestamp)
        .bind(entry.category.as_str())
        .bind(&entry.message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| LmsError::Database(e.to_string()))?;

        Ok(entry)
    }

    async fn list(&self) -> Result<Vec<LogEntry>> {
        let entries = sqlx::query_as::<_, LogEntry>(
            "SELECT id, timestamp, category, message
             FROM system_logs ORDER BY timestamp DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| LmsError::Database(e.to_string()))?;

        Ok(entries)
    }
}
