use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{
    identity::Identity,
    session::SessionId,
    token::SecondFactorToken,
    two_fa_code::TwoFaCode,
    user::{User, UserId},
};

// TokenStore port trait and errors
#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Persistence for outstanding second-factor codes.
///
/// Every lookup is scoped by user and code together: the same code value may be
/// outstanding for several users at once.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Append a token. Existing tokens of the user are kept.
    async fn insert(&self, token: SecondFactorToken) -> Result<(), TokenStoreError>;

    /// Any token of `user_id` with exactly `code` created after `issued_after`.
    async fn find_match(
        &self,
        user_id: &UserId,
        code: TwoFaCode,
        issued_after: DateTime<Utc>,
    ) -> Result<Option<SecondFactorToken>, TokenStoreError>;

    /// Atomically look up a live `(user_id, code)` token and, when one exists,
    /// delete every token of the user. Returns the matched token.
    ///
    /// Two concurrent calls for the same pair never both return `Some`.
    async fn consume_match(
        &self,
        user_id: &UserId,
        code: TwoFaCode,
        issued_after: DateTime<Utc>,
    ) -> Result<Option<SecondFactorToken>, TokenStoreError>;

    /// Delete tokens created at or before `cutoff`. Returns how many were removed.
    async fn sweep_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, TokenStoreError>;

    /// Delete every token of `user_id`. Returns how many were removed.
    async fn invalidate_all(&self, user_id: &UserId) -> Result<u64, TokenStoreError>;
}

// UserDirectory port trait and errors
#[derive(Debug, Error)]
pub enum UserDirectoryError {
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Read access to the host's users.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_identity(
        &self,
        identity: &Identity,
    ) -> Result<Option<User>, UserDirectoryError>;
}

// UserSettings port trait and errors
#[derive(Debug, Error)]
pub enum UserSettingsError {
    #[error("User not found")]
    UserNotFound,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Per-user settings of the host. Only the enrollment flag is used here.
#[async_trait]
pub trait UserSettings: Send + Sync {
    /// Whether the user enrolled in two-factor login. Users without a stored
    /// setting are not enrolled.
    async fn second_factor_enabled(&self, user_id: &UserId) -> Result<bool, UserSettingsError>;

    async fn set_second_factor_enabled(
        &self,
        user_id: &UserId,
        enabled: bool,
    ) -> Result<(), UserSettingsError>;
}

// SessionStore port trait and errors
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("Corrupted session data: {0}")]
    Corrupted(String),
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Host session storage, keyed by session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(
        &self,
        id: &SessionId,
    ) -> Result<Option<HashMap<String, String>>, SessionStoreError>;

    async fn save(
        &self,
        id: &SessionId,
        data: &HashMap<String, String>,
    ) -> Result<(), SessionStoreError>;

    async fn delete(&self, id: &SessionId) -> Result<(), SessionStoreError>;
}
