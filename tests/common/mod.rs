//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use lms::config::AuthConfig;
use lms::mail::{Mailer, MemoryTransport, SentMail};
use lms::web::AppState;
use lms::{Database, TokenEngine};

pub const TEST_SECRET: &str = "integration-test-secret-0123456789";
pub const BASE_URL: &str = "http://lms.test";

/// Services wired over an in-memory database with a capturing mail transport.
pub struct TestApp {
    pub db: Database,
    pub state: AppState,
    pub tokens: Arc<TokenEngine>,
    pub mail: Arc<MemoryTransport>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = Database::open_in_memory()
            .await
            .expect("Failed to create test database");
        Self::with_database(db)
    }

    pub fn with_database(db: Database) -> Self {
        let tokens = Arc::new(TokenEngine::new(TEST_SECRET));
        let mail = Arc::new(MemoryTransport::new());
        let mailer = Mailer::new(mail.clone(), BASE_URL);
        let state = AppState::new(&db, tokens.clone(), mailer, &AuthConfig::default());
        Self {
            db,
            state,
            tokens,
            mail,
        }
    }

    /// Wait for a mail to `recipient` whose subject matches, and return it.
    pub async fn wait_for_mail(&self, recipient: &str, subject: &str) -> SentMail {
        for _ in 0..200 {
            let found = self
                .mail
                .sent()
                .await
                .into_iter()
                .rev()
                .find(|m| m.recipient == recipient && m.subject == subject);
            if let Some(mail) = found {
                return mail;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("no mail with subject {subject:?} sent to {recipient}");
    }

    /// Register, verify and return the user's id.
    pub async fn verified_user(&self, email: &str, password: &str) -> i64 {
        let user = self.state.accounts.register(email, password).await.unwrap();
        let mail = self
            .wait_for_mail(email, lms::mail::VERIFICATION_SUBJECT)
            .await;
        self.state
            .accounts
            .verify_email(&token_from_mail(&mail), email)
            .await
            .unwrap();
        user.id
    }
}

/// Pull the `token` query parameter out of a mailed link.
pub fn token_from_mail(mail: &SentMail) -> String {
    let start = mail
        .body
        .find("token=")
        .expect("mail body has no token")
        + "token=".len();
    let rest = &mail.body[start..];
    let end = rest.find('"').unwrap_or(rest.len());
    urlencoding::decode(&rest[..end])
        .expect("token is not valid UTF-8")
        .into_owned()
}
