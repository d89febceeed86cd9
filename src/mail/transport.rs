//! Mail transports.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::Result;

/// Outbound mail delivery.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Deliver one HTML message.
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()>;

    /// Where messages end up, for startup logging.
    fn describe(&self) -> String;
}

/// Transport that writes messages to the tracing log instead of delivering them.
///
/// Links are logged at info level so an operator running without SMTP can
/// still hand out verification and reset links.
#[derive(Debug, Clone, Default)]
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        let links = links_in(body);
        info!(recipient, subject, ?links, "Outbound mail (not delivered)");
        tracing::debug!(recipient, body, "Outbound mail body");
        Ok(())
    }

    fn describe(&self) -> String {
        "log".to_string()
    }
}

/// Targets of the `href` attributes in an HTML body.
fn links_in(body: &str) -> Vec<&str> {
    body.split("href=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .collect()
}

/// A message captured by [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Transport that keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    sent: Mutex<Vec<SentMail>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the messages sent so far.
    pub async fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl MailTransport for MemoryTransport {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        self.sent.lock().await.push(SentMail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
    fn describe(&self) -> String {
        "memory".to_string()
    }
}
