//! SMTP delivery of account emails.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use super::MailTransport;
use crate::config::MailConfig;
use crate::{LmsError, Result};

/// Transport that submits HTML messages to an SMTP relay over STARTTLS.
pub struct SmtpTransport {
    relay: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    endpoint: String,
}

impl SmtpTransport {
    /// Build a transport from the `[mail]` section.
    ///
    /// No connection is opened until the first message is sent.
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        let host = config
            .smtp_host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| LmsError::Config("mail.smtp_host is not set".to_string()))?;

        let from_address = config
            .smtp_from
            .as_deref()
            .ok_or_else(|| LmsError::Config("mail.smtp_from is not set".to_string()))?;
        let from: Mailbox = from_address
            .parse()
            .map_err(|e| LmsError::Config(format!("invalid mail.smtp_from: {e}")))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| LmsError::Config(format!("invalid SMTP relay {host}: {e}")))?
            .port(config.smtp_port);

        if let Some(password) = &config.smtp_password {
            let username = config
                .smtp_username
                .clone()
                .unwrap_or_else(|| from.email.to_string());
            builder = builder.credentials(Credentials::new(username, password.clone()));
        }

        Ok(Self {
            relay: builder.build(),
            from,
            endpoint: format!("smtp://{}:{}", host, config.smtp_port),
        })
    }

    /// Sender of every message.
    pub fn from_mailbox(&self) -> &Mailbox {
        &self.from
    }

    fn build_message(&self, recipient: &str, subject: &str, body: &str) -> Result<Message> {
        let to: Mailbox = recipient
            .parse()
            .map_err(|e| LmsError::Mail(format!("invalid recipient {recipient}: {e}")))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body.to_string())
            .map_err(|e| LmsError::Mail(e.to_string()))
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        let message = self.build_message(recipient, subject, body)?;
        self.relay
            .send(message)
            .await
            .map_err(|e| LmsError::Mail(format!("SMTP delivery failed: {e}")))?;

        info!(recipient, subject, "Mail delivered");
        Ok(())
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}
