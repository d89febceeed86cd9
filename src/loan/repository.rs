//! Loan repository for LMS.

use async_trait::async_trait;
use sqlx::{QueryBuilder, SqlitePool};

use super::types::{Loan, LoanQuery, LoanStatus, NewLoan};
use crate::db::LoanStore;
use crate::{LmsError, Result};

const LOAN_COLUMNS: &str = "id, user_id, amount, status, created_at";

/// SQLite-backed loan store.
#[derive(Clone)]
pub struct LoanRepository {
    pool: SqlitePool,
}

impl LoanRepository {
    /// Create a new LoanRepository over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanStore for LoanRepository {
    async fn create(&self, new_loan: &NewLoan) -> Result<Loan> {
        let loan = sqlx::query_as::<_, Loan>(&format!(
            "INSERT INTO loans (user_id, amount, status, created_at)
             VALUES (?, ?, ?, ?) RETURNING {LOAN_COLUMNS}"
        ))
        .bind(new_loan.user_id)
        .bind(&new_loan.amount)
        .bind(LoanStatus::Pending.as_str())
        .bind(new_loan.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| LmsError::Database(e.to_string()))?;

        Ok(loan)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(&format!(
            "SELECT {LOAN_COLUMNS} FROM loans WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LmsError::Database(e.to_string()))?;

        Ok(loan)
    }

    async fn query(&self, query: &LoanQuery) -> Result<Vec<Loan>> {
        let mut builder: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new(format!("SELECT {LOAN_COLUMNS} FROM loans WHERE 1 = 1"));

        if let Some(user_id) = query.user_id {
            builder.push(" AND user_id = ");
            builder.push_bind(user_id);
        }
        if let Some(status) = query.status {
            builder.push(" AND status = ");
            builder.push_bind(status.as_str());
        }

        let direction = query.order.as_sql();
        builder.push(format!(" ORDER BY created_at {direction}, id {direction}"));

        let loans = builder
            .build_query_as::<Loan>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| LmsError::Database(e.to_string()))?;

        Ok(loans)
    }

    async fn update_status_if(
        &self,
        id: i64,
        expected: LoanStatus,
        new: LoanStatus,
    ) -> Result<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(&format!(
            "UPDATE loans SET status = ? WHERE id = ? AND status = ? RETURNING {LOAN_COLUMNS}"
        ))
        .bind(new.as_str())
        .bind(id)
        .bind(expected.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LmsError::Database(e.to_string()))?;

        Ok(loan)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM loans WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| LmsError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }
}
