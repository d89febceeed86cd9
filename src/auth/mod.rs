//! Authentication module for LMS.
//!
//! This module provides password hashing, stateless token issuance and
//! validation, and the access policy derived from session tokens.

mod password;
pub mod policy;
pub mod token;
pub mod validation;

pub use password::{
    hash_password, validate_password, verify_password, verify_password_or_dummy, PasswordError,
    MAX_PASSWORD_LENGTH,
};
pub use policy::{authenticate, Identity};
pub use token::{
    AuthError, PurposeClaims, SessionClaims, TokenEngine, TokenPurpose, PURPOSE_TOKEN_TTL,
};
pub use validation::ValidationError;
