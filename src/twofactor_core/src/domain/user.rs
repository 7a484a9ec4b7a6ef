use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{email::Email, identity::Identity};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserError {
    #[error("Invalid identity")]
    InvalidIdentity,
    #[error("Invalid email")]
    InvalidEmail,
    #[error("Missing credential")]
    MissingCredential,
}

/// Stable identifier of a user in the host identity system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A user as seen by the second-factor layer. Owned by the host, only read here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    identity: Identity,
    email: Email,
    name: String,
    active: bool,
}

impl User {
    pub fn new(id: UserId, identity: Identity, email: Email, name: String, active: bool) -> Self {
        Self {
            id,
            identity,
            email,
            name,
            active,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}
