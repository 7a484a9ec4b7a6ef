use std::collections::HashMap;
use std::fmt;

use rand::{Rng, distr::Alphanumeric};
use serde::{Deserialize, Serialize};

const SESSION_ID_LENGTH: usize = 48;

/// Session keys written by the login flow.
pub mod keys {
    /// Identity that passed the primary check and still owes its code.
    pub const PENDING_IDENTITY: &str = "twofactor.pending_identity";
    /// Identity of a fully authenticated session.
    pub const AUTHENTICATED_IDENTITY: &str = "twofactor.identity";
    /// Deep link remembered by the host before the login started.
    pub const REDIRECT_URL: &str = "redirect_url";
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        let id = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(SESSION_ID_LENGTH)
            .map(char::from)
            .collect();
        Self(id)
    }

    /// Accept an id sent back by a client. Anything that could not have been
    /// generated here is refused so it is never used as a storage key.
    pub fn parse(raw: &str) -> Option<Self> {
        (raw.len() == SESSION_ID_LENGTH && raw.bytes().all(|b| b.is_ascii_alphanumeric()))
            .then(|| Self(raw.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Session ids are bearer secrets: keep them out of Debug output.
impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionId([REDACTED])")
    }
}

/// Request-scoped handle on the server-side session.
///
/// The handle is loaded from a `SessionStore` before a request is processed,
/// mutated by the login flow, and written back afterwards. It records whether
/// its id was rotated so the store can drop the old record.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    data: HashMap<String, String>,
    persisted: bool,
    rotated_from: Option<SessionId>,
    rotated: bool,
    modified: bool,
}

impl Session {
    /// A brand new session that has never been stored.
    pub fn new() -> Self {
        Self {
            id: SessionId::generate(),
            data: HashMap::new(),
            persisted: false,
            rotated_from: None,
            rotated: false,
            modified: false,
        }
    }

    /// A session read back from a store.
    pub fn resume(id: SessionId, data: HashMap<String, String>) -> Self {
        Self {
            id,
            data,
            persisted: true,
            rotated_from: None,
            rotated: false,
            modified: false,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.data.insert(key.to_owned(), value.into());
        self.modified = true;
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let removed = self.data.remove(key);
        if removed.is_some() {
            self.modified = true;
        }
        removed
    }

    /// Give the session a new id while keeping its data.
    ///
    /// Rotation happens at most once per handle, i.e. once per request.
    pub fn regenerate_id(&mut self) {
        if self.rotated {
            return;
        }
        let previous = std::mem::replace(&mut self.id, SessionId::generate());
        if self.persisted {
            self.rotated_from = Some(previous);
        }
        self.rotated = true;
        // A fresh empty session has nothing to store under its new id.
        if self.persisted || !self.data.is_empty() {
            self.modified = true;
        }
    }

    pub fn was_rotated(&self) -> bool {
        self.rotated
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn is_new(&self) -> bool {
        !self.persisted
    }

    pub fn data(&self) -> &HashMap<String, String> {
        &self.data
    }

    /// Id the session had before it was rotated, if it had been stored under it.
    pub fn take_rotated_from(&mut self) -> Option<SessionId> {
        self.rotated_from.take()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
