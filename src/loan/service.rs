//! Loan service for LMS.
//!
//! This module owns the loan status state machine and applies the access
//! policy to every loan operation.

use std::sync::Arc;

use tracing::info;

use crate::audit::{AuditLog, LogCategory};
use crate::auth::Identity;
use crate::db::LoanStore;
use crate::{LmsError, Result};

use super::types::{Loan, LoanFilter, LoanQuery, LoanStatus, NewLoan};

/// Maximum length of an amount string.
pub const MAX_AMOUNT_LENGTH: usize = 32;

/// Validate a loan amount.
///
/// Accepts plain positive decimals such as `1000` or `2500.75`.
pub fn validate_amount(amount: &str) -> Result<()> {
    if amount.is_empty() {
        return Err(LmsError::Validation("amount is required".to_string()));
    }
    if amount.len() > MAX_AMOUNT_LENGTH {
        return Err(LmsError::Validation(format!(
            "amount must be at most {MAX_AMOUNT_LENGTH} characters"
        )));
    }

    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (amount, None),
    };

    let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(whole) || !fraction.map_or(true, is_digits) {
        return Err(LmsError::Validation(
            "amount must be a positive decimal number".to_string(),
        ));
    }

    if amount.bytes().all(|b| b == b'0' || b == b'.') {
        return Err(LmsError::Validation(
            "amount must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

/// Service for loan applications.
#[derive(Clone)]
pub struct LoanService {
    loans: Arc<dyn LoanStore>,
    audit: AuditLog,
}

impl LoanService {
    /// Create a new LoanService.
    pub fn new(loans: Arc<dyn LoanStore>, audit: AuditLog) -> Self {
        Self { loans, audit }
    }

    /// Submit a loan application for the caller.
    pub async fn create(&self, identity: &Identity, amount: &str) -> Result<Loan> {
        let amount = amount.trim();
        validate_amount(amount)?;

        let loan = self
            .loans
            .create(&NewLoan::new(identity.user_id, amount))
            .await?;

        info!(loan_id = loan.id, user_id = identity.user_id, "Loan application submitted");
        self.audit
            .record(
                LogCategory::LoanSubmission,
                format!(
                    "User {} submitted a loan application with amount {}",
                    identity.user_id, loan.amount
                ),
            )
            .await;

        Ok(loan)
    }

    /// Get a loan visible to the caller.
    ///
    /// Loans owned by someone else are reported as not found.
    pub async fn get_status(&self, loan_id: i64, identity: &Identity) -> Result<Loan> {
        let loan = self
            .loans
            .get_by_id(loan_id)
            .await?
            .ok_or_else(|| LmsError::NotFound("loan".to_string()))?;

        identity.ensure_owner_or_admin(loan.user_id, "loan")?;
        Ok(loan)
    }

    /// List loans visible to the caller.
    ///
    /// Non-admins only ever see their own loans, whatever the filter says.
    pub async fn list(&self, filter: LoanFilter, identity: &Identity) -> Result<Vec<Loan>> {
        let query = LoanQuery {
            user_id: (!identity.is_admin).then_some(identity.user_id),
            status: filter.status,
            order: filter.effective_order(),
        };
        self.loans.query(&query).await
    }

    /// Approve or reject a pending loan. Admin only.
    pub async fn transition(
        &self,
        identity: &Identity,
        loan_id: i64,
        target: LoanStatus,
    ) -> Result<Loan> {
        identity.require_admin()?;

        if !LoanStatus::Pending.can_transition_to(target) {
            return Err(LmsError::Validation(format!(
                "cannot move a loan to {target}"
            )));
        }

        let updated = self
            .loans
            .update_status_if(loan_id, LoanStatus::Pending, target)
            .await?;

        let loan = match updated {
            Some(loan) => loan,
            None => {
                return match self.loans.get_by_id(loan_id).await? {
                    Some(current) => Err(LmsError::Conflict(format!(
                        "loan is already {}",
                        current.status
                    ))),
                    None => Err(LmsError::NotFound("loan".to_string())),
                };
            }
        };

        info!(loan_id, status = %target, admin_id = identity.user_id, "Loan status updated");
        self.audit
            .record(
                LogCategory::LoanStatusUpdate,
                format!("Loan application {loan_id} was {target}"),
            )
            .await;

        Ok(loan)
    }

    /// Delete a loan regardless of status. Admin only.
    pub async fn delete(&self, identity: &Identity, loan_id: i64) -> Result<()> {
        identity.require_admin()?;

        if !self.loans.delete(loan_id).await? {
            return Err(LmsError::NotFound("loan".to_string()));
        }

        info!(loan_id, admin_id = identity.user_id, "Loan deleted");
        self.audit
            .record(LogCategory::LoanDeletion, format!("Loan {loan_id} was deleted"))
            .await;

        Ok(())
    }
}
