//! Outbound email for LMS.
//!
//! Verification and password reset messages are dispatched on a detached
//! task. Delivery failures are logged and never reach the caller.

mod smtp;
mod transport;

pub use smtp::SmtpTransport;
pub use transport::{LogTransport, MailTransport, MemoryTransport, SentMail};

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::MailConfig;
use crate::Result;

/// Pick the transport for the `[mail]` section.
///
/// SMTP when a relay host is configured, otherwise the log.
pub fn build_transport(config: &MailConfig) -> Result<Arc<dyn MailTransport>> {
    if config.smtp_enabled() {
        Ok(Arc::new(SmtpTransport::from_config(config)?))
    } else {
        warn!("No SMTP relay configured; account emails are only written to the log");
        Ok(Arc::new(LogTransport))
    }
}

/// Subject of the verification email.
pub const VERIFICATION_SUBJECT: &str = "Verify Your Email Address";
/// Subject of the password reset email.
pub const PASSWORD_RESET_SUBJECT: &str = "Reset Your Password";

/// Builds account emails and hands them to a transport.
#[derive(Clone)]
pub struct Mailer {
    transport: Arc<dyn MailTransport>,
    base_url: String,
}

impl Mailer {
    /// Create a mailer. `base_url` prefixes the links in every message.
    pub fn new(transport: Arc<dyn MailTransport>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            base_url,
        }
    }

    /// Link that activates an account.
    pub fn verification_link(&self, email: &str, token: &str) -> String {
        self.link("/users/verify-email", email, token)
    }

    /// Link that opens the password update form.
    pub fn password_reset_link(&self, email: &str, token: &str) -> String {
        self.link("/users/password-update", email, token)
    }

    /// Send the email verification message.
    pub fn send_verification(&self, email: &str, token: &str) {
        let link = self.verification_link(email, token);
        let body = render(
            "Email Verification",
            "Thank you for registering with Loan Manager! Please click the link below to verify your email address:",
            &link,
            "Verify Email",
            "If you did not register for this account, you can ignore this email.",
        );
        self.dispatch(email, VERIFICATION_SUBJECT, body);
    }

    /// Send the password reset message.
    pub fn send_password_reset(&self, email: &str, token: &str) {
        let link = self.password_reset_link(email, token);
        let body = render(
            "Password Reset",
            "We received a request to reset your password. Please click the link below to choose a new password:",
            &link,
            "Reset Password",
            "If you did not request a password reset, you can ignore this email.",
        );
        self.dispatch(email, PASSWORD_RESET_SUBJECT, body);
    }

    fn link(&self, path: &str, email: &str, token: &str) -> String {
        format!(
            "{}{}?email={}&token={}",
            self.base_url,
            path,
            urlencoding::encode(email),
            urlencoding::encode(token)
        )
    }

    fn dispatch(&self, recipient: &str, subject: &'static str, body: String) {
        let transport = Arc::clone(&self.transport);
        let recipient = recipient.to_string();
        tokio::spawn(async move {
            match transport.send(&recipient, subject, &body).await {
                Ok(()) => debug!(recipient = %recipient, subject, "Mail dispatched"),
                Err(e) => warn!(recipient = %recipient, subject, error = %e, "Failed to send mail"),
            }
        });
    }
}

fn render(title: &str, intro: &str, link: &str, label: &str, footer: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
</head>
<body>
    <p>Hello,</p>
    <p>{intro}</p>
    <p><a href="{link}">{label}</a></p>
    <p>{footer}</p>
    <p>Best regards,<br>The Loan Manager Team</p>
</body>
</html>"#
    )
}
