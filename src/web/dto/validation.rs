//! Request body validation.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::web::error::ApiError;

/// A JSON extractor that validates the request body.
///
/// Malformed JSON is rejected as a bad request; a body that parses but
/// fails validation yields field-level details.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}

/// Validate that a string is not empty after trimming whitespace.
pub fn not_empty_trimmed(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("not_empty_trimmed")
            .with_message("Must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::dto::{CreateLoanRequest, PasswordUpdateRequest};

    #[test]
    fn test_not_empty_trimmed() {
        assert!(not_empty_trimmed("100").is_ok());
        assert!(not_empty_trimmed("").is_err());
        assert!(not_empty_trimmed("  \t").is_err());
    }

    #[test]
    fn test_password_confirmation_must_match() {
        let ok = PasswordUpdateRequest {
            password: "newpw".to_string(),
            confirm_password: "newpw".to_string(),
        };
        assert!(ok.validate().is_ok());

        let mismatch = PasswordUpdateRequest {
            password: "newpw".to_string(),
            confirm_password: "other".to_string(),
        };
        let errors = mismatch.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("confirm_password"));
    }

    #[test]
    fn test_blank_amount_rejected() {
        let req = CreateLoanRequest {
            amount: "   ".to_string(),
        };
        assert!(req.validate().is_err());
    }
}
