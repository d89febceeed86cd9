//! LMS - Loan Management System
//!
//! Account lifecycle with email verification, stateless session and purpose
//! tokens, and an admin-driven loan approval workflow over SQLite.

pub mod account;
pub mod audit;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod loan;
pub mod logging;
pub mod mail;
pub mod web;

pub use account::{AccountService, LoginResult, SessionTokens};
pub use audit::{AuditLog, LogCategory, LogEntry};
pub use auth::{
    authenticate, hash_password, validate_password, verify_password, AuthError, Identity,
    PasswordError, TokenEngine, TokenPurpose, ValidationError,
};
pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository, UserUpdate};
pub use error::{LmsError, Result};
pub use loan::{Loan, LoanFilter, LoanService, LoanStatus, SortOrder};
pub use mail::{LogTransport, MailTransport, Mailer, MemoryTransport, SmtpTransport};
