//! The two-step login flow.
//!
//! Step 1 checks identity and credential. Enrolled users then get a code by
//! email and the pending identity is kept in the session until step 2 accepts
//! a matching code. Session keys used:
//!
//! - `PENDING_IDENTITY`: set between a successful step 1 and step 2
//! - `AUTHENTICATED_IDENTITY`: set once the login is complete
//! - `REDIRECT_URL`: optional target after login, consumed on success

mod login;
mod login_token;
mod resend_token;

use async_trait::async_trait;
use thiserror::Error;
use twofactor_core::{
    AuthenticatorError, Clock, EmailClient, Identity, LoginEvent, LoginFlow, LoginObserver,
    LoginOutcome, LoginStep, LoginSubmission, PrimaryAuthenticator, Session, Step2Entry,
    TokenStore, TokenStoreError, TwoFactorError, User, UserDirectory, UserDirectoryError,
    UserSettings, session_keys,
};

use super::{
    issue_token::{DeliveryError, TokenDelivery, TokenIssuer},
    second_factor::{SecondFactorAuthenticator, SecondFactorError},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginFlowConfig {
    /// Where to go after login when the session holds no redirect target.
    pub landing_path: String,
}

impl Default for LoginFlowConfig {
    fn default() -> Self {
        Self {
            landing_path: "/".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoginFlowError {
    #[error("Second factor error: {0}")]
    SecondFactorError(#[from] SecondFactorError),
    #[error("Authenticator error: {0}")]
    AuthenticatorError(#[from] AuthenticatorError),
    #[error("Token store error: {0}")]
    TokenStoreError(#[from] TokenStoreError),
    #[error("User directory error: {0}")]
    UserDirectoryError(#[from] UserDirectoryError),
    #[error("Delivery error: {0}")]
    DeliveryError(#[from] DeliveryError),
}

impl From<LoginFlowError> for TwoFactorError {
    fn from(err: LoginFlowError) -> Self {
        match err {
            LoginFlowError::DeliveryError(e) => TwoFactorError::DeliveryFailed(e.to_string()),
            other => TwoFactorError::Internal(other.to_string()),
        }
    }
}

/// Drives both login steps and the resend action on a session.
pub struct LoginOrchestrator<A, D, S, T, C, E, O>
where
    A: PrimaryAuthenticator,
    D: UserDirectory,
    S: UserSettings,
    T: TokenStore,
    C: Clock,
    E: EmailClient,
    O: LoginObserver,
{
    second_factor: SecondFactorAuthenticator<A, D, S, T, C>,
    issuer: TokenIssuer<T, C>,
    delivery: TokenDelivery<E>,
    observer: O,
    config: LoginFlowConfig,
}

impl<A, D, S, T, C, E, O> LoginOrchestrator<A, D, S, T, C, E, O>
where
    A: PrimaryAuthenticator,
    D: UserDirectory,
    S: UserSettings,
    T: TokenStore + Clone,
    C: Clock + Clone,
    E: EmailClient,
    O: LoginObserver,
{
    pub fn new(
        second_factor: SecondFactorAuthenticator<A, D, S, T, C>,
        delivery: TokenDelivery<E>,
        observer: O,
        config: LoginFlowConfig,
    ) -> Self {
        let issuer = TokenIssuer::new(
            second_factor.token_store().clone(),
            second_factor.clock().clone(),
        );
        Self {
            second_factor,
            issuer,
            delivery,
            observer,
            config,
        }
    }
}

impl<A, D, S, T, C, E, O> LoginOrchestrator<A, D, S, T, C, E, O>
where
    A: PrimaryAuthenticator,
    D: UserDirectory,
    S: UserSettings,
    T: TokenStore,
    C: Clock,
    E: EmailClient,
    O: LoginObserver,
{
    pub fn second_factor(&self) -> &SecondFactorAuthenticator<A, D, S, T, C> {
        &self.second_factor
    }

    pub fn config(&self) -> &LoginFlowConfig {
        &self.config
    }

    fn already_authenticated(&self, session: &Session) -> Option<LoginOutcome> {
        session
            .get(session_keys::AUTHENTICATED_IDENTITY)
            .map(|_| LoginOutcome::AlreadyAuthenticated {
                redirect_to: self.config.landing_path.clone(),
            })
    }

    fn pending_identity(&self, session: &Session) -> Option<Identity> {
        session
            .get(session_keys::PENDING_IDENTITY)
            .and_then(|raw| Identity::parse(raw).ok())
    }

    async fn issue_and_deliver(&self, user: &User) -> Result<(), LoginFlowError> {
        let token = self.issuer.create_token(user).await?;
        self.delivery.deliver(user, &token).await?;
        Ok(())
    }

    /// Mark the session as logged in as `user`.
    async fn finalize(
        &self,
        session: &mut Session,
        user: &User,
        second_factor: bool,
    ) -> LoginOutcome {
        session.regenerate_id();
        session.remove(session_keys::PENDING_IDENTITY);
        session.insert(session_keys::AUTHENTICATED_IDENTITY, user.identity().as_str());

        let redirect_to = session
            .remove(session_keys::REDIRECT_URL)
            .filter(|target| is_local_path(target))
            .unwrap_or_else(|| self.config.landing_path.clone());

        let now = self.second_factor.clock().now();
        self.observer
            .user_logged_in(LoginEvent::new(user, second_factor, now))
            .await;
        tracing::info!(user_id = %user.id(), second_factor, "User logged in");

        LoginOutcome::Authenticated {
            identity: user.identity().clone(),
            redirect_to,
        }
    }
}

/// Only same-site absolute paths are followed after login.
fn is_local_path(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.contains('\\')
}

fn recover(step: LoginStep, err: LoginFlowError) -> LoginOutcome {
    tracing::error!(error = %err, ?step, "Login step failed");
    LoginOutcome::failed(step, err.into())
}

#[async_trait]
impl<A, D, S, T, C, E, O> LoginFlow for LoginOrchestrator<A, D, S, T, C, E, O>
where
    A: PrimaryAuthenticator + 'static,
    D: UserDirectory + 'static,
    S: UserSettings + 'static,
    T: TokenStore + 'static,
    C: Clock + 'static,
    E: EmailClient + 'static,
    O: LoginObserver + 'static,
{
    async fn login(&self, session: &mut Session, submission: LoginSubmission) -> LoginOutcome {
        self.step_credentials(session, submission).await
    }

    async fn login_token(&self, session: &mut Session, entry: Step2Entry) -> LoginOutcome {
        self.step_code(session, entry).await
    }

    async fn resend_token(&self, session: &mut Session) -> LoginOutcome {
        self.resend(session).await
    }
}
