//! Loan model for LMS.
//!
//! This module defines the Loan struct, the LoanStatus state machine and the
//! query types used to list loans.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Loan application status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// Submitted, awaiting an administrative decision.
    #[default]
    Pending,
    /// Approved by an admin. Terminal.
    Approved,
    /// Rejected by an admin. Terminal.
    Rejected,
}

impl LoanStatus {
    /// Convert status to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Pending => "pending",
            LoanStatus::Approved => "approved",
            LoanStatus::Rejected => "rejected",
        }
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoanStatus::Pending)
    }

    /// Check whether `self -> target` is an allowed transition.
    pub fn can_transition_to(&self, target: LoanStatus) -> bool {
        *self == LoanStatus::Pending && target.is_terminal()
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LoanStatus {
    type Err = String;

    /// Accepts both the stored names and the action verbs used by the
    /// admin routes (`approve`, `reject`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(LoanStatus::Pending),
            "approved" | "approve" => Ok(LoanStatus::Approved),
            "rejected" | "reject" => Ok(LoanStatus::Rejected),
            _ => Err(format!("unknown loan status: {s}")),
        }
    }
}

impl TryFrom<String> for LoanStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Loan entity.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Loan {
    /// Unique loan ID.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Requested amount, kept in its textual decimal form.
    pub amount: String,
    /// Current status.
    #[sqlx(try_from = "String")]
    pub status: LoanStatus,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new loan.
#[derive(Debug, Clone)]
pub struct NewLoan {
    /// Owning user.
    pub user_id: i64,
    /// Requested amount.
    pub amount: String,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
}

impl NewLoan {
    /// Create a new loan stamped with the current time.
    pub fn new(user_id: i64, amount: impl Into<String>) -> Self {
        Self {
            user_id,
            amount: amount.into(),
            created_at: Utc::now(),
        }
    }
}

/// Sort direction on `created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest first.
    Asc,
    /// Newest first.
    #[default]
    Desc,
}

impl SortOrder {
    /// SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(format!("unknown sort order: {s}")),
        }
    }
}

/// Caller-supplied listing filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoanFilter {
    /// Only loans in this status.
    pub status: Option<LoanStatus>,
    /// Explicit sort order.
    pub order: Option<SortOrder>,
}

impl LoanFilter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a status.
    pub fn status(mut self, status: LoanStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the sort order.
    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// Resolve the effective order.
    ///
    /// Pending queues read oldest first unless told otherwise; everything
    /// else defaults to newest first.
    pub fn effective_order(&self) -> SortOrder {
        match (self.order, self.status) {
            (Some(order), _) => order,
            (None, Some(LoanStatus::Pending)) => SortOrder::Asc,
            (None, _) => SortOrder::Desc,
        }
    }
}

/// Fully resolved query handed to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanQuery {
    /// Only loans owned by this user.
    pub user_id: Option<i64>,
    /// Only loans in this status.
    pub status: Option<LoanStatus>,
    /// Sort direction on `created_at`, ties broken by id.
    pub order: SortOrder,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_str() {
        assert_eq!("pending".parse::<LoanStatus>().unwrap(), LoanStatus::Pending);
        assert_eq!("approve".parse::<LoanStatus>().unwrap(), LoanStatus::Approved);
        assert_eq!("Approved".parse::<LoanStatus>().unwrap(), LoanStatus::Approved);
        assert_eq!("reject".parse::<LoanStatus>().unwrap(), LoanStatus::Rejected);
        assert!("cancel".parse::<LoanStatus>().is_err());
    }

    #[test]
    fn test_status_transitions() {
        assert!(LoanStatus::Pending.can_transition_to(LoanStatus::Approved));
        assert!(LoanStatus::Pending.can_transition_to(LoanStatus::Rejected));
        assert!(!LoanStatus::Pending.can_transition_to(LoanStatus::Pending));
        assert!(!LoanStatus::Approved.can_transition_to(LoanStatus::Rejected));
        assert!(!LoanStatus::Rejected.can_transition_to(LoanStatus::Approved));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&LoanStatus::Approved).unwrap();
        assert_eq!(json, "\"approved\"");
    }

    #[test]
    fn test_effective_order() {
        assert_eq!(LoanFilter::new().effective_order(), SortOrder::Desc);
        assert_eq!(
            LoanFilter::new()
                .status(LoanStatus::Pending)
                .effective_order(),
            SortOrder::Asc
        );
        assert_eq!(
            LoanFilter::new()
                .status(LoanStatus::Pending)
                .order(SortOrder::Desc)
                .effective_order(),
            SortOrder::Desc
        );
        assert_eq!(
            LoanFilter::new()
                .status(LoanStatus::Approved)
                .effective_order(),
            SortOrder::Desc
        );
    }

    #[test]
    fn test_sort_order_from_str() {
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("sideways".parse::<SortOrder>().is_err());
    }
}
