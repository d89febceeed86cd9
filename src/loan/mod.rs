//! Loan applications for LMS.
//!
//! A loan is created `pending` and moves exactly once, to `approved` or
//! `rejected`, by an admin. The move is a single conditional update in the
//! store, so concurrent decisions on the same loan cannot both succeed.

mod repository;
mod service;
mod types;

pub use repository::LoanRepository;
pub use service::{validate_amount, LoanService, MAX_AMOUNT_LENGTH};
pub use types::{Loan, LoanFilter, LoanQuery, LoanStatus, NewLoan, SortOrder};
