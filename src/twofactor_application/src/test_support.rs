//! In-memory ports shared by the use case tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret, Secret};
use tokio::sync::{Mutex, RwLock};
use twofactor_core::{
    AuthVerdict, AuthenticatorError, Clock, Credential, Email, EmailClient, Identity,
    LoginEvent, LoginObserver, ManualClock, MessageTemplate, PrimaryAuthenticator,
    SecondFactorToken, TokenStore, TokenStoreError, TwoFaCode, User, UserDirectory,
    UserDirectoryError, UserId, UserSettings, UserSettingsError,
};

use crate::{
    EnrollmentPolicy, LoginFlowConfig, LoginOrchestrator, SecondFactorAuthenticator, SiteInfo,
    TokenDelivery,
};

#[derive(Clone, Default)]
pub struct InMemoryUsers {
    users: Arc<RwLock<HashMap<String, (User, String)>>>,
    enrolled: Arc<RwLock<HashMap<UserId, bool>>>,
    primary_calls: Arc<AtomicUsize>,
}

impl InMemoryUsers {
    pub fn user(identity: &str, active: bool) -> User {
        User::new(
            UserId::new(),
            Identity::parse(identity).unwrap(),
            Email::parse(Secret::new(identity.to_string())).unwrap(),
            "Test User".to_string(),
            active,
        )
    }

    pub async fn add(&self, identity: &str, password: &str, enrolled: bool) -> User {
        let user = Self::user(identity, true);
        self.enrolled.write().await.insert(*user.id(), enrolled);
        self.users
            .write()
            .await
            .insert(identity.to_string(), (user.clone(), password.to_string()));
        user
    }

    pub async fn deactivate(&self, identity: &str) {
        let mut users = self.users.write().await;
        if let Some((user, _)) = users.get_mut(identity) {
            *user = User::new(
                *user.id(),
                user.identity().clone(),
                user.email().clone(),
                user.name().to_string(),
                false,
            );
        }
    }

    pub fn primary_calls(&self) -> usize {
        self.primary_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserDirectory for InMemoryUsers {
    async fn find_by_identity(
        &self,
        identity: &Identity,
    ) -> Result<Option<User>, UserDirectoryError> {
        Ok(self
            .users
            .read()
            .await
            .get(identity.as_str())
            .map(|(user, _)| user.clone()))
    }
}

#[async_trait]
impl UserSettings for InMemoryUsers {
    async fn second_factor_enabled(&self, user_id: &UserId) -> Result<bool, UserSettingsError> {
        self.enrolled
            .read()
            .await
            .get(user_id)
            .copied()
            .ok_or(UserSettingsError::UserNotFound)
    }

    async fn set_second_factor_enabled(
        &self,
        user_id: &UserId,
        enabled: bool,
    ) -> Result<(), UserSettingsError> {
        self.enrolled.write().await.insert(*user_id, enabled);
        Ok(())
    }
}

#[async_trait]
impl PrimaryAuthenticator for InMemoryUsers {
    async fn authenticate(
        &self,
        identity: &Identity,
        credential: &Credential,
    ) -> Result<AuthVerdict, AuthenticatorError> {
        self.primary_calls.fetch_add(1, Ordering::SeqCst);
        let users = self.users.read().await;
        Ok(match users.get(identity.as_str()) {
            Some((user, _)) if !user.is_active() => AuthVerdict::IdentityNotFound,
            Some((user, password)) if credential.as_ref().expose_secret() == password => {
                AuthVerdict::Success(user.clone())
            }
            Some(_) => AuthVerdict::CredentialInvalid("password mismatch".to_string()),
            None => AuthVerdict::IdentityNotFound,
        })
    }
}

#[derive(Clone, Default)]
pub struct InMemoryTokens {
    tokens: Arc<Mutex<Vec<SecondFactorToken>>>,
}

impl InMemoryTokens {
    pub async fn all(&self) -> Vec<SecondFactorToken> {
        self.tokens.lock().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.tokens.lock().await.len()
    }

    pub async fn for_user(&self, user_id: &UserId) -> Vec<SecondFactorToken> {
        self.tokens
            .lock()
            .await
            .iter()
            .filter(|token| token.user_id() == user_id)
            .cloned()
            .collect()
    }
}

fn is_match(
    token: &SecondFactorToken,
    user_id: &UserId,
    code: TwoFaCode,
    issued_after: DateTime<Utc>,
) -> bool {
    token.user_id() == user_id && token.code() == code && token.created_at() > issued_after
}

#[async_trait]
impl TokenStore for InMemoryTokens {
    async fn insert(&self, token: SecondFactorToken) -> Result<(), TokenStoreError> {
        self.tokens.lock().await.push(token);
        Ok(())
    }

    async fn find_match(
        &self,
        user_id: &UserId,
        code: TwoFaCode,
        issued_after: DateTime<Utc>,
    ) -> Result<Option<SecondFactorToken>, TokenStoreError> {
        Ok(self
            .tokens
            .lock()
            .await
            .iter()
            .find(|token| is_match(token, user_id, code, issued_after))
            .cloned())
    }

    async fn consume_match(
        &self,
        user_id: &UserId,
        code: TwoFaCode,
        issued_after: DateTime<Utc>,
    ) -> Result<Option<SecondFactorToken>, TokenStoreError> {
        let mut tokens = self.tokens.lock().await;
        let found = tokens
            .iter()
            .find(|token| is_match(token, user_id, code, issued_after))
            .cloned();
        if found.is_some() {
            tokens.retain(|token| token.user_id() != user_id);
        }
        Ok(found)
    }

    async fn sweep_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, TokenStoreError> {
        let mut tokens = self.tokens.lock().await;
        let before = tokens.len();
        tokens.retain(|token| token.created_at() > cutoff);
        Ok((before - tokens.len()) as u64)
    }

    async fn invalidate_all(&self, user_id: &UserId) -> Result<u64, TokenStoreError> {
        let mut tokens = self.tokens.lock().await;
        let before = tokens.len();
        tokens.retain(|token| token.user_id() != user_id);
        Ok((before - tokens.len()) as u64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

#[derive(Clone, Default)]
pub struct RecordingEmailClient {
    sent: Arc<Mutex<Vec<SentEmail>>>,
    failure: Arc<std::sync::Mutex<Option<String>>>,
}

impl RecordingEmailClient {
    pub async fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().await.clone()
    }

    pub fn fail_with(&self, reason: &str) {
        *self.failure.lock().unwrap() = Some(reason.to_string());
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }
}

#[async_trait]
impl EmailClient for RecordingEmailClient {
    async fn send_email(
        &self,
        recipient: &Email,
        subject: &str,
        content: &str,
    ) -> Result<(), String> {
        let failure = self.failure.lock().unwrap().clone();
        if let Some(reason) = failure {
            return Err(reason);
        }
        self.sent.lock().await.push(SentEmail {
            recipient: recipient.as_ref().expose_secret().to_string(),
            subject: subject.to_string(),
            body: content.to_string(),
        });
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<LoginEvent>>>,
}

impl RecordingObserver {
    pub async fn events(&self) -> Vec<LoginEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl LoginObserver for RecordingObserver {
    async fn user_logged_in(&self, event: LoginEvent) {
        self.events.lock().await.push(event);
    }
}

pub type TestOrchestrator = LoginOrchestrator<
    InMemoryUsers,
    InMemoryUsers,
    InMemoryUsers,
    InMemoryTokens,
    ManualClock,
    RecordingEmailClient,
    RecordingObserver,
>;

pub struct Harness {
    pub users: InMemoryUsers,
    pub tokens: InMemoryTokens,
    pub clock: ManualClock,
    pub email_client: RecordingEmailClient,
    pub observer: RecordingObserver,
    pub flow: TestOrchestrator,
}

impl Harness {
    pub async fn issue(&self, user: &User, code: u16) -> SecondFactorToken {
        let token = SecondFactorToken::new(
            *user.id(),
            TwoFaCode::from_value(code).unwrap(),
            self.clock.now(),
        );
        self.tokens.insert(token.clone()).await.unwrap();
        token
    }
}

/// Orchestrator over in-memory ports with a 1200s expiration and `/account`
/// as landing page.
pub fn harness(force_all: bool) -> Harness {
    let users = InMemoryUsers::default();
    let tokens = InMemoryTokens::default();
    let clock = ManualClock::default();
    let email_client = RecordingEmailClient::default();
    let observer = RecordingObserver::default();

    let second_factor = SecondFactorAuthenticator::new(
        users.clone(),
        users.clone(),
        EnrollmentPolicy::new(users.clone(), force_all),
        tokens.clone(),
        clock.clone(),
        TimeDelta::seconds(1200),
    );
    let delivery = TokenDelivery::new(
        email_client.clone(),
        MessageTemplate::default(),
        SiteInfo {
            title: "Example".to_string(),
            url: "https://example.com".to_string(),
        },
    );
    let flow = LoginOrchestrator::new(
        second_factor,
        delivery,
        observer.clone(),
        LoginFlowConfig {
            landing_path: "/account".to_string(),
        },
    );

    Harness {
        users,
        tokens,
        clock,
        email_client,
        observer,
        flow,
    }
}
