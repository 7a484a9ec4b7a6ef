use std::sync::Arc;

use secrecy::ExposeSecret;
use tokio::sync::RwLock;
use twofactor_core::{Email, EmailClient};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub content: String,
}

/// Email client that keeps messages in memory instead of sending them.
///
/// Used by the standalone service without a mail provider and by tests, which
/// read the code back from the outbox or switch the client into failing mode.
#[derive(Debug, Clone, Default)]
pub struct MockEmailClient {
    outbox: Arc<RwLock<Vec<SentEmail>>>,
    failure: Arc<RwLock<Option<String>>>,
}

impl MockEmailClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<SentEmail> {
        self.outbox.read().await.clone()
    }

    pub async fn last_sent_to(&self, recipient: &str) -> Option<SentEmail> {
        self.outbox
            .read()
            .await
            .iter()
            .rev()
            .find(|email| email.recipient == recipient)
            .cloned()
    }

    /// Make every following send fail with `reason`.
    pub async fn fail_with(&self, reason: impl Into<String>) {
        *self.failure.write().await = Some(reason.into());
    }

    pub async fn recover(&self) {
        *self.failure.write().await = None;
    }
}

#[async_trait::async_trait]
impl EmailClient for MockEmailClient {
    async fn send_email(
        &self,
        recipient: &Email,
        subject: &str,
        content: &str,
    ) -> Result<(), String> {
        if let Some(reason) = self.failure.read().await.clone() {
            return Err(reason);
        }
        let recipient = recipient.as_ref().expose_secret().to_string();
        tracing::debug!(%recipient, subject, "Email kept in memory");
        self.outbox.write().await.push(SentEmail {
            recipient,
            subject: subject.to_string(),
            content: content.to_string(),
        });
        Ok(())
    }
}
