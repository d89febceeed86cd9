//! Configuration module for LMS.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::{LmsError, Result};

/// Minimum accepted length of the token signing secret.
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/lms.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/lms.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign every token.
    #[serde(default)]
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_secs: u64,
    /// Refresh token lifetime in seconds.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_secs: u64,
}

fn default_access_ttl() -> u64 {
    3600 // 1 hour
}

fn default_refresh_ttl() -> u64 {
    7 * 3600 // 7 hours
}

impl AuthConfig {
    /// Access token lifetime.
    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_token_ttl_secs)
    }

    /// Refresh token lifetime.
    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_token_ttl_secs)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_token_ttl_secs: default_access_ttl(),
            refresh_token_ttl_secs: default_refresh_ttl(),
        }
    }
}

/// Outbound mail configuration.
///
/// Without `smtp_host` account emails are written to the log.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Public URL prefixed to the links in account emails.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// SMTP relay host. STARTTLS is required.
    #[serde(default)]
    pub smtp_host: Option<String>,
    /// SMTP submission port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP login. Defaults to the sender address.
    #[serde(default)]
    pub smtp_username: Option<String>,
    /// SMTP password or app key.
    #[serde(default)]
    pub smtp_password: Option<String>,
    /// Sender address of account emails.
    #[serde(default)]
    pub smtp_from: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

impl MailConfig {
    /// Whether account emails go out over SMTP.
    pub fn smtp_enabled(&self) -> bool {
        self.smtp_host.as_deref().is_some_and(|h| !h.trim().is_empty())
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_username: None,
            smtp_password: None,
            smtp_from: None,
        }
    }
}

/// HTTP layer configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WebConfig {
    /// Allowed CORS origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Admin account created at startup.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AdminConfig {
    /// Admin login email. No admin is bootstrapped when unset.
    #[serde(default)]
    pub email: Option<String>,
    /// Admin password, used only when the account is first created.
    #[serde(default)]
    pub password: Option<String>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Token configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Mail configuration.
    #[serde(default)]
    pub mail: MailConfig,
    /// HTTP layer configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Admin bootstrap.
    #[serde(default)]
    pub admin: AdminConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(LmsError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| LmsError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `LMS_JWT_SECRET`: Override the token signing secret
    /// - `LMS_ADMIN_PASSWORD`: Override the bootstrap admin password
    /// - `LMS_SMTP_PASSWORD`: Override the SMTP password
    pub fn apply_env_overrides(&mut self) {
        if let Ok(jwt_secret) = std::env::var("LMS_JWT_SECRET") {
            if !jwt_secret.is_empty() {
                self.auth.jwt_secret = jwt_secret;
            }
        }
        if let Ok(password) = std::env::var("LMS_ADMIN_PASSWORD") {
            if !password.is_empty() {
                self.admin.password = Some(password);
            }
        }
        if let Ok(password) = std::env::var("LMS_SMTP_PASSWORD") {
            if !password.is_empty() {
                self.mail.smtp_password = Some(password);
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the JWT secret is missing or shorter than `MIN_JWT_SECRET_LENGTH`
    /// - a token lifetime is zero
    /// - an admin email is configured without a password
    /// - SMTP is enabled without a sender address
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(LmsError::Config(
                "jwt_secret is not set. \
                 Set it in config.toml or via LMS_JWT_SECRET environment variable."
                    .to_string(),
            ));
        }
        if self.auth.jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(LmsError::Config(format!(
                "jwt_secret must be at least {MIN_JWT_SECRET_LENGTH} bytes"
            )));
        }
        if self.auth.access_token_ttl_secs == 0 || self.auth.refresh_token_ttl_secs == 0 {
            return Err(LmsError::Config(
                "token lifetimes must be greater than zero".to_string(),
            ));
        }
        if self.admin.email.is_some() && self.admin.password.is_none() {
            return Err(LmsError::Config(
                "admin.email is set but no admin password was given. \
                 Set admin.password or LMS_ADMIN_PASSWORD."
                    .to_string(),
            ));
        }
        if self.mail.smtp_enabled() && self.mail.smtp_from.is_none() {
            return Err(LmsError::Config(
                "mail.smtp_host is set but mail.smtp_from is missing".to_string(),
            ));
        }
        Ok(())
    }
}
