use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use twofactor_core::{SessionId, SessionStore, SessionStoreError};

struct Entry {
    data: HashMap<String, String>,
    expires_at: DateTime<Utc>,
}

/// Sessions kept in a concurrent map. Entries expire `ttl` after their last save
/// and expired entries are swept on every save.
#[derive(Clone)]
pub struct DashMapSessionStore {
    sessions: Arc<DashMap<SessionId, Entry>>,
    ttl: TimeDelta,
}

impl DashMapSessionStore {
    pub fn new(ttl: TimeDelta) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait::async_trait]
impl SessionStore for DashMapSessionStore {
    async fn load(
        &self,
        id: &SessionId,
    ) -> Result<Option<HashMap<String, String>>, SessionStoreError> {
        let now = Utc::now();
        // The removal below must not run while a read guard is held.
        let data = match self.sessions.get(id) {
            Some(entry) if entry.expires_at > now => return Ok(Some(entry.data.clone())),
            Some(_) => None,
            None => return Ok(None),
        };
        self.sessions.remove(id);
        Ok(data)
    }

    async fn save(
        &self,
        id: &SessionId,
        data: &HashMap<String, String>,
    ) -> Result<(), SessionStoreError> {
        let now = Utc::now();
        self.sessions.retain(|_, entry| entry.expires_at > now);
        self.sessions.insert(
            id.clone(),
            Entry {
                data: data.clone(),
                expires_at: now + self.ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        self.sessions.remove(id);
        Ok(())
    }
}
