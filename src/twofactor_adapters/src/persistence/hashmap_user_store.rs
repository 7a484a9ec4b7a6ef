use std::collections::HashMap;
use std::sync::Arc;

use secrecy::{ExposeSecret, Secret};
use tokio::sync::RwLock;
use twofactor_core::{
    AuthVerdict, AuthenticatorError, Credential, Identity, PrimaryAuthenticator, User,
    UserDirectory, UserDirectoryError, UserId, UserSettings, UserSettingsError,
};

struct StoredUser {
    user: User,
    password: Secret<String>,
    second_factor: bool,
}

/// In-memory users with plain-text passwords. Serves as user directory,
/// enrollment settings and primary authenticator for the standalone service
/// and for tests.
#[derive(Default, Clone)]
pub struct HashMapUserStore {
    users: Arc<RwLock<HashMap<Identity, StoredUser>>>,
}

impl HashMapUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a user.
    pub async fn add_user(&self, user: User, password: Secret<String>, second_factor: bool) {
        self.users.write().await.insert(
            user.identity().clone(),
            StoredUser {
                user,
                password,
                second_factor,
            },
        );
    }
}

#[async_trait::async_trait]
impl UserDirectory for HashMapUserStore {
    async fn find_by_identity(
        &self,
        identity: &Identity,
    ) -> Result<Option<User>, UserDirectoryError> {
        Ok(self
            .users
            .read()
            .await
            .get(identity)
            .map(|stored| stored.user.clone()))
    }
}

#[async_trait::async_trait]
impl UserSettings for HashMapUserStore {
    async fn second_factor_enabled(&self, user_id: &UserId) -> Result<bool, UserSettingsError> {
        self.users
            .read()
            .await
            .values()
            .find(|stored| stored.user.id() == user_id)
            .map(|stored| stored.second_factor)
            .ok_or(UserSettingsError::UserNotFound)
    }

    async fn set_second_factor_enabled(
        &self,
        user_id: &UserId,
        enabled: bool,
    ) -> Result<(), UserSettingsError> {
        let mut users = self.users.write().await;
        let stored = users
            .values_mut()
            .find(|stored| stored.user.id() == user_id)
            .ok_or(UserSettingsError::UserNotFound)?;
        stored.second_factor = enabled;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PrimaryAuthenticator for HashMapUserStore {
    #[tracing::instrument(name = "Checking password in memory", skip_all)]
    async fn authenticate(
        &self,
        identity: &Identity,
        credential: &Credential,
    ) -> Result<AuthVerdict, AuthenticatorError> {
        let users = self.users.read().await;
        let Some(stored) = users.get(identity).filter(|stored| stored.user.is_active()) else {
            return Ok(AuthVerdict::IdentityNotFound);
        };

        if stored.password.expose_secret() != credential.as_ref().expose_secret() {
            return Ok(AuthVerdict::CredentialInvalid(
                "password does not match".to_string(),
            ));
        }
        Ok(AuthVerdict::Success(stored.user.clone()))
    }
}
