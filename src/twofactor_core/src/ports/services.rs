use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    email::Email,
    identity::Identity,
    user::{User, UserId},
};

/// Port trait for email sending service
#[async_trait]
pub trait EmailClient: Send + Sync {
    async fn send_email(
        &self,
        recipient: &Email,
        subject: &str,
        content: &str,
    ) -> Result<(), String>;
}

/// Raised once a session becomes authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginEvent {
    pub user_id: UserId,
    pub identity: Identity,
    pub second_factor: bool,
    pub at: DateTime<Utc>,
}

impl LoginEvent {
    pub fn new(user: &User, second_factor: bool, at: DateTime<Utc>) -> Self {
        Self {
            user_id: *user.id(),
            identity: user.identity().clone(),
            second_factor,
            at,
        }
    }
}

/// Observer notified after a successful login. Fire-and-forget: the flow does
/// not wait on or react to what observers do.
#[async_trait]
pub trait LoginObserver: Send + Sync {
    async fn user_logged_in(&self, event: LoginEvent);
}
