//! Request DTOs.

use serde::Deserialize;
use validator::Validate;

use crate::web::dto::validation::not_empty_trimmed;

/// POST /users/register body.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 254, message = "Email is required"))]
    pub email: String,
    #[validate(length(
        min = 1,
        max = 128,
        message = "Password must be 1 to 128 characters"
    ))]
    pub password: String,
}

/// POST /users/login body.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Query string of the verification link.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub email: String,
    pub token: String,
}

/// POST /users/password-reset body.
#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
}

/// Query string of the password update link.
#[derive(Debug, Deserialize)]
pub struct PasswordUpdateQuery {
    pub email: String,
    pub token: String,
}

/// POST /users/password-update body.
#[derive(Debug, Deserialize, Validate)]
pub struct PasswordUpdateRequest {
    #[validate(length(
        min = 1,
        max = 128,
        message = "Password must be 1 to 128 characters"
    ))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

/// POST /users/token/refresh body.
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// POST /loans body.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLoanRequest {
    #[validate(custom(function = "not_empty_trimmed"))]
    pub amount: String,
}

/// Query string of loan listings.
#[derive(Debug, Default, Deserialize)]
pub struct LoanListQuery {
    pub status: Option<String>,
    pub order: Option<String>,
}
