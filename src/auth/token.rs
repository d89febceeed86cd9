//! Stateless signed tokens.
//!
//! Two families share one HS256 signing key:
//!
//! - session tokens (access / refresh) carrying `{user_id, email, is_admin}`
//! - purpose tokens bound to a single workflow (email verification or
//!   password reset) and to one `{user_id, email}` pair
//!
//! Nothing is stored server-side. A purpose token stays valid until it
//! expires; the actions it authorizes are safe to repeat.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::db::User;
use crate::{LmsError, Result};

/// Lifetime of email verification and password reset tokens.
pub const PURPOSE_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Token validation failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Bad signature, bad encoding, or wrong claim structure.
    #[error("token is malformed")]
    Malformed,

    /// The token's deadline has passed.
    #[error("token has expired")]
    Expired,

    /// Purpose, user or email differ from the presentation context.
    #[error("token does not match the request")]
    Mismatch,
}

/// Claims of an access or refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID).
    pub sub: i64,
    /// Email at issuance time.
    pub email: String,
    /// Admin flag at issuance time.
    pub is_admin: bool,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiration (unix seconds).
    pub exp: i64,
}

impl SessionClaims {
    /// User ID the token was issued for.
    pub fn user_id(&self) -> i64 {
        self.sub
    }
}

/// Workflow a purpose token is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// Account activation link.
    EmailVerification,
    /// Password reset link.
    PasswordReset,
}

impl TokenPurpose {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::EmailVerification => "email_verification",
            TokenPurpose::PasswordReset => "password_reset",
        }
    }
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims of a purpose token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurposeClaims {
    /// Subject (user ID).
    pub sub: i64,
    /// Email the token was sent to.
    pub email: String,
    /// Bound workflow.
    pub purpose: TokenPurpose,
    /// Expiration (unix seconds).
    pub exp: i64,
}

/// Issues and validates both token families.
///
/// Built once from the signing secret and shared; holds no mutable state.
#[derive(Clone)]
pub struct TokenEngine {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenEngine {
    /// Create an engine from a shared secret.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against our own clock so that `now >= exp` is expired.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a session token for `user` that expires after `ttl`.
    pub fn issue_session(&self, user: &User, ttl: Duration) -> Result<String> {
        self.issue_session_at(user, ttl, Utc::now())
    }

    /// Issue a session token as if the current time were `now`.
    pub fn issue_session_at(&self, user: &User, ttl: Duration, now: DateTime<Utc>) -> Result<String> {
        let iat = now.timestamp();
        let claims = SessionClaims {
            sub: user.id,
            email: user.email.clone(),
            is_admin: user.is_admin,
            iat,
            exp: iat.saturating_add(ttl_secs(ttl)),
        };
        self.sign(&claims)
    }

    /// Validate a session token.
    pub fn validate_session(&self, token: &str) -> std::result::Result<SessionClaims, AuthError> {
        self.validate_session_at(token, Utc::now())
    }

    /// Validate a session token against the given clock reading.
    pub fn validate_session_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<SessionClaims, AuthError> {
        let claims: SessionClaims = self.verify(token)?;
        if now.timestamp() >= claims.exp {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }

    /// Issue a purpose token with an absolute deadline.
    pub fn issue_purpose(
        &self,
        user_id: i64,
        email: &str,
        purpose: TokenPurpose,
        expires_at: DateTime<Utc>,
    ) -> Result<String> {
        let claims = PurposeClaims {
            sub: user_id,
            email: email.to_string(),
            purpose,
            exp: expires_at.timestamp(),
        };
        self.sign(&claims)
    }

    /// Validate a purpose token against the context it is presented in.
    pub fn validate_purpose(
        &self,
        token: &str,
        expected_email: &str,
        expected_user_id: i64,
        expected_purpose: TokenPurpose,
    ) -> std::result::Result<(), AuthError> {
        self.validate_purpose_at(
            token,
            expected_email,
            expected_user_id,
            expected_purpose,
            Utc::now(),
        )
    }

    /// Validate a purpose token against the given clock reading.
    pub fn validate_purpose_at(
        &self,
        token: &str,
        expected_email: &str,
        expected_user_id: i64,
        expected_purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> std::result::Result<(), AuthError> {
        let claims: PurposeClaims = self.verify(token)?;

        if claims.email != expected_email
            || claims.sub != expected_user_id
            || claims.purpose != expected_purpose
        {
            return Err(AuthError::Mismatch);
        }
        if now.timestamp() >= claims.exp {
            return Err(AuthError::Expired);
        }
        Ok(())
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String> {
        encode(&Header::default(), claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            LmsError::Internal("failed to sign token".to_string())
        })
    }

    fn verify<T: DeserializeOwned>(&self, token: &str) -> std::result::Result<T, AuthError> {
        decode::<T>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("JWT validation failed: {}", e);
                AuthError::Malformed
            })
    }
}

impl fmt::Debug for TokenEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenEngine").finish_non_exhaustive()
    }
}

fn ttl_secs(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)
}
