//! Account lifecycle service for LMS.
//!
//! Accounts move `unregistered -> pending -> active`. Registration creates
//! an inactive account and mails a verification link; only an active
//! account can log in or request a password reset.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::audit::{AuditLog, LogCategory};
use crate::auth::validation::{normalize_email, validate_email};
use crate::auth::{
    hash_password, validate_password, verify_password_or_dummy, Identity, TokenEngine,
    TokenPurpose, PURPOSE_TOKEN_TTL,
};
use crate::db::{NewUser, User, UserStore, UserUpdate};
use crate::mail::Mailer;
use crate::{LmsError, Result};

const LOGIN_FAILED: &str = "invalid email or password";

/// Access and refresh tokens issued at login.
#[derive(Debug, Clone, Serialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Outcome of a successful login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: User,
    pub tokens: SessionTokens,
}

/// Service for registration, verification, login and password reset.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenEngine>,
    mailer: Mailer,
    audit: AuditLog,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl AccountService {
    /// Create a new AccountService.
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<TokenEngine>,
        mailer: Mailer,
        audit: AuditLog,
    ) -> Self {
        Self {
            users,
            tokens,
            mailer,
            audit,
            access_ttl: Duration::from_secs(60 * 60),
            refresh_ttl: Duration::from_secs(7 * 60 * 60),
        }
    }

    /// Override the session token lifetimes.
    pub fn with_ttls(mut self, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        self.access_ttl = access_ttl;
        self.refresh_ttl = refresh_ttl;
        self
    }

    /// Register a new, inactive account and send the verification email.
    pub async fn register(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);
        validate_email(&email).map_err(|e| LmsError::Validation(e.to_string()))?;
        validate_password(password).map_err(|e| LmsError::Validation(e.to_string()))?;

        if self.users.get_by_email(&email).await?.is_some() {
            return Err(LmsError::Conflict("email already registered".to_string()));
        }

        let password_hash = hash_password(password)?;
        let user = self.users.create(&NewUser::new(&email, password_hash)).await?;

        let token = self.issue_purpose_token(&user, TokenPurpose::EmailVerification)?;
        self.mailer.send_verification(&user.email, &token);

        info!(user_id = user.id, email = %user.email, "User registered");
        self.audit
            .record(
                LogCategory::UserRegistration,
                format!("User {} registered with email {}", user.id, user.email),
            )
            .await;

        Ok(user)
    }

    /// Activate an account from a verification link.
    ///
    /// Presenting a valid token for an already active account succeeds
    /// without touching the record.
    pub async fn verify_email(&self, token: &str, email: &str) -> Result<User> {
        let user = self.find_by_email(email).await?;

        self.tokens
            .validate_purpose(token, &user.email, user.id, TokenPurpose::EmailVerification)
            .map_err(|e| {
                warn!(user_id = user.id, error = %e, "Email verification rejected");
                LmsError::Unauthorized(format!("invalid verification token: {e}"))
            })?;

        if user.is_active {
            return Ok(user);
        }

        let user = self
            .users
            .update(user.id, &UserUpdate::new().is_active(true))
            .await?
            .ok_or_else(|| LmsError::NotFound("user".to_string()))?;

        info!(user_id = user.id, "Email verified");
        self.audit
            .record(
                LogCategory::EmailVerification,
                format!("User {} verified email {}", user.id, user.email),
            )
            .await;

        Ok(user)
    }

    /// Authenticate with email and password and issue session tokens.
    ///
    /// Unknown email, inactive account and wrong password all fail with
    /// the same message, and each runs exactly one Argon2 verification.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult> {
        let email = normalize_email(email);
        let user = self.users.get_by_email(&email).await?;
        let password_ok = verify_password_or_dummy(
            password,
            user.as_ref().map(|user| user.password_hash.as_str()),
        );

        let user = match user {
            Some(user) if password_ok && user.is_active => user,
            Some(user) => {
                warn!(user_id = user.id, active = user.is_active, "Login rejected");
                return Err(LmsError::Unauthorized(LOGIN_FAILED.to_string()));
            }
            None => {
                warn!(email = %email, "Login rejected for unknown email");
                return Err(LmsError::Unauthorized(LOGIN_FAILED.to_string()));
            }
        };

        let tokens = SessionTokens {
            access_token: self.tokens.issue_session(&user, self.access_ttl)?,
            refresh_token: self.tokens.issue_session(&user, self.refresh_ttl)?,
            expires_in: self.access_ttl.as_secs(),
        };

        info!(user_id = user.id, "User logged in");
        self.audit
            .record(
                LogCategory::LoginAttempt,
                format!("User {} logged in successfully", user.id),
            )
            .await;

        Ok(LoginResult { user, tokens })
    }

    /// Start a password reset by mailing a reset link.
    pub async fn forget_password(&self, email: &str) -> Result<()> {
        let user = self.find_by_email(email).await?;

        if !user.is_active {
            return Err(LmsError::Forbidden("account is not verified".to_string()));
        }

        let token = self.issue_purpose_token(&user, TokenPurpose::PasswordReset)?;
        self.mailer.send_password_reset(&user.email, &token);

        info!(user_id = user.id, "Password reset requested");
        self.audit
            .record(
                LogCategory::PasswordResetRequest,
                format!("User {} requested a password reset", user.id),
            )
            .await;

        Ok(())
    }

    /// Complete a password reset.
    pub async fn reset_password(&self, token: &str, email: &str, new_password: &str) -> Result<()> {
        let user = self.find_by_email(email).await?;

        self.tokens
            .validate_purpose(token, &user.email, user.id, TokenPurpose::PasswordReset)
            .map_err(|e| {
                warn!(user_id = user.id, error = %e, "Password reset rejected");
                LmsError::Unauthorized(format!("invalid reset token: {e}"))
            })?;

        validate_password(new_password).map_err(|e| LmsError::Validation(e.to_string()))?;
        let password_hash = hash_password(new_password)?;

        self.users
            .update(user.id, &UserUpdate::new().password_hash(password_hash))
            .await?
            .ok_or_else(|| LmsError::NotFound("user".to_string()))?;

        info!(user_id = user.id, "Password reset completed");
        self.audit
            .record(
                LogCategory::PasswordResetCompletion,
                format!("User {} completed password reset", user.id),
            )
            .await;

        Ok(())
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The new token reflects the current user record, so role changes
    /// take effect on refresh.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<String> {
        let claims = self.tokens.validate_session(refresh_token).map_err(|e| {
            warn!(error = %e, "Refresh token rejected");
            LmsError::Unauthorized("invalid or expired refresh token".to_string())
        })?;

        let user = match self.users.get_by_id(claims.user_id()).await? {
            Some(user) if user.is_active => user,
            _ => {
                return Err(LmsError::Unauthorized(
                    "account is no longer available".to_string(),
                ))
            }
        };

        self.tokens.issue_session(&user, self.access_ttl)
    }

    /// Get the caller's own account.
    pub async fn profile(&self, identity: &Identity) -> Result<User> {
        self.users
            .get_by_id(identity.user_id)
            .await?
            .ok_or_else(|| LmsError::NotFound("user".to_string()))
    }

    /// List every account. Admin only.
    pub async fn list_users(&self, identity: &Identity) -> Result<Vec<User>> {
        identity.require_admin()?;
        self.users.list().await
    }

    /// Get any account by ID. Admin only.
    pub async fn get_user(&self, identity: &Identity, user_id: i64) -> Result<User> {
        identity.require_admin()?;
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| LmsError::NotFound("user".to_string()))
    }

    /// Ensure the configured admin account exists, is active and holds
    /// the admin role. An existing account keeps its password.
    pub async fn bootstrap_admin(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);
        validate_email(&email).map_err(|e| LmsError::Validation(e.to_string()))?;

        if let Some(existing) = self.users.get_by_email(&email).await? {
            if existing.is_active && existing.is_admin {
                return Ok(existing);
            }
            let user = self
                .users
                .update(
                    existing.id,
                    &UserUpdate::new().is_active(true).is_admin(true),
                )
                .await?
                .ok_or_else(|| LmsError::NotFound("user".to_string()))?;
            info!(user_id = user.id, "Promoted existing account to admin");
            return Ok(user);
        }

        let password_hash = hash_password(password)?;
        let user = self
            .users
            .create(&NewUser::new(&email, password_hash).active().admin())
            .await?;
        info!(user_id = user.id, email = %user.email, "Created admin account");
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<User> {
        self.users
            .get_by_email(&normalize_email(email))
            .await?
            .ok_or_else(|| LmsError::NotFound("user".to_string()))
    }

    fn issue_purpose_token(&self, user: &User, purpose: TokenPurpose) -> Result<String> {
        let ttl = chrono::Duration::from_std(PURPOSE_TOKEN_TTL)
            .map_err(|e| LmsError::Internal(e.to_string()))?;
        self.tokens
            .issue_purpose(user.id, &user.email, purpose, Utc::now() + ttl)
    }
}
