use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{two_fa_code::TwoFaCode, user::UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(Uuid);

impl TokenId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for TokenId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One outstanding second-factor code. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondFactorToken {
    id: TokenId,
    user_id: UserId,
    code: TwoFaCode,
    created_at: DateTime<Utc>,
}

impl SecondFactorToken {
    pub fn new(user_id: UserId, code: TwoFaCode, created_at: DateTime<Utc>) -> Self {
        Self::restore(TokenId::new(), user_id, code, created_at)
    }

    /// Rebuild a token read back from storage.
    pub fn restore(
        id: TokenId,
        user_id: UserId,
        code: TwoFaCode,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            code,
            created_at,
        }
    }

    pub fn id(&self) -> &TokenId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn code(&self) -> TwoFaCode {
        self.code
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// A token is live while `now - created_at < expiration`.
    pub fn is_live_at(&self, now: DateTime<Utc>, expiration: TimeDelta) -> bool {
        self.created_at > now - expiration
    }
}

/// Oldest creation time a token may have and still be live at `now`.
///
/// Tokens created at or before the returned instant are expired.
pub fn expiry_cutoff(now: DateTime<Utc>, expiration: TimeDelta) -> DateTime<Utc> {
    now - expiration
}
