use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use twofactor_core::{SecondFactorToken, TokenStore, TokenStoreError, TwoFaCode, UserId};

/// Token store held in process memory, keyed by user.
#[derive(Default, Clone)]
pub struct HashMapTokenStore {
    tokens: Arc<RwLock<HashMap<UserId, Vec<SecondFactorToken>>>>,
}

impl HashMapTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn tokens_of(&self, user_id: &UserId) -> Vec<SecondFactorToken> {
        self.tokens
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }
}

fn find_live(
    tokens: &[SecondFactorToken],
    code: TwoFaCode,
    issued_after: DateTime<Utc>,
) -> Option<&SecondFactorToken> {
    tokens
        .iter()
        .find(|token| token.code() == code && token.created_at() > issued_after)
}

#[async_trait::async_trait]
impl TokenStore for HashMapTokenStore {
    async fn insert(&self, token: SecondFactorToken) -> Result<(), TokenStoreError> {
        self.tokens
            .write()
            .await
            .entry(*token.user_id())
            .or_default()
            .push(token);
        Ok(())
    }

    async fn find_match(
        &self,
        user_id: &UserId,
        code: TwoFaCode,
        issued_after: DateTime<Utc>,
    ) -> Result<Option<SecondFactorToken>, TokenStoreError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .get(user_id)
            .and_then(|tokens| find_live(tokens, code, issued_after))
            .cloned())
    }

    async fn consume_match(
        &self,
        user_id: &UserId,
        code: TwoFaCode,
        issued_after: DateTime<Utc>,
    ) -> Result<Option<SecondFactorToken>, TokenStoreError> {
        let mut tokens = self.tokens.write().await;
        let matched = tokens
            .get(user_id)
            .and_then(|tokens| find_live(tokens, code, issued_after))
            .cloned();
        if matched.is_some() {
            tokens.remove(user_id);
        }
        Ok(matched)
    }

    async fn sweep_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, TokenStoreError> {
        let mut tokens = self.tokens.write().await;
        let mut removed = 0;
        tokens.retain(|_, user_tokens| {
            let before = user_tokens.len();
            user_tokens.retain(|token| token.created_at() > cutoff);
            removed += (before - user_tokens.len()) as u64;
            !user_tokens.is_empty()
        });
        Ok(removed)
    }

    async fn invalidate_all(&self, user_id: &UserId) -> Result<u64, TokenStoreError> {
        Ok(self
            .tokens
            .write()
            .await
            .remove(user_id)
            .map_or(0, |tokens| tokens.len() as u64))
    }
}
