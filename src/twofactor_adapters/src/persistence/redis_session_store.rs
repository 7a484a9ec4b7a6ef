use std::collections::HashMap;
use std::sync::Arc;

use redis::{Commands, Connection};
use tokio::sync::RwLock;
use twofactor_core::{SessionId, SessionStore, SessionStoreError};

/// Sessions stored in Redis as JSON, expiring `ttl_seconds` after the last save.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: Arc<RwLock<Connection>>,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    pub fn new(conn: Arc<RwLock<Connection>>, ttl_seconds: u64) -> Self {
        Self { conn, ttl_seconds }
    }
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    #[tracing::instrument(name = "Loading session from Redis", skip_all)]
    async fn load(
        &self,
        id: &SessionId,
    ) -> Result<Option<HashMap<String, String>>, SessionStoreError> {
        let key = get_key(id);
        let mut conn = self.conn.write().await;
        let raw: Option<String> = conn
            .get(&key)
            .map_err(|e| SessionStoreError::UnexpectedError(e.to_string()))?;

        raw.map(|raw| {
            serde_json::from_str(&raw).map_err(|e| SessionStoreError::Corrupted(e.to_string()))
        })
        .transpose()
    }

    #[tracing::instrument(name = "Saving session to Redis", skip_all)]
    async fn save(
        &self,
        id: &SessionId,
        data: &HashMap<String, String>,
    ) -> Result<(), SessionStoreError> {
        let key = get_key(id);
        let value = serde_json::to_string(data)
            .map_err(|e| SessionStoreError::UnexpectedError(e.to_string()))?;

        let mut conn = self.conn.write().await;
        conn.set_ex(key, value, self.ttl_seconds)
            .map_err(|e| SessionStoreError::UnexpectedError(e.to_string()))
    }

    #[tracing::instrument(name = "Deleting session from Redis", skip_all)]
    async fn delete(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        let key = get_key(id);
        let mut conn = self.conn.write().await;
        conn.del(key)
            .map_err(|e| SessionStoreError::UnexpectedError(e.to_string()))
    }
}

const SESSION_KEY_PREFIX: &str = "session:";

fn get_key(id: &SessionId) -> String {
    format!("{}{}", SESSION_KEY_PREFIX, id.as_str())
}
