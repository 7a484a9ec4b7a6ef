use async_trait::async_trait;
use chrono::TimeDelta;
use secrecy::ExposeSecret;
use thiserror::Error;
use twofactor_core::{
    AuthVerdict, AuthenticatorError, Clock, Credential, Identity, PrimaryAuthenticator,
    TokenStore, TokenStoreError, TwoFaCode, User, UserDirectory, UserDirectoryError,
    UserSettings, UserSettingsError, expiry_cutoff,
};

use super::enrollment::EnrollmentPolicy;

pub const MISSING_CODE_MESSAGE: &str = "Missing two-factor authentication code.";
pub const INVALID_CODE_MESSAGE: &str = "Invalid or expired code.";

#[derive(Debug, Error)]
pub enum SecondFactorError {
    #[error("User directory error: {0}")]
    UserDirectoryError(#[from] UserDirectoryError),
    #[error("User settings error: {0}")]
    UserSettingsError(#[from] UserSettingsError),
    #[error("Token store error: {0}")]
    TokenStoreError(#[from] TokenStoreError),
}

impl From<SecondFactorError> for AuthenticatorError {
    fn from(err: SecondFactorError) -> Self {
        AuthenticatorError::UnexpectedError(err.to_string())
    }
}

/// Authenticator for the second step: checks an emailed code for enrolled users
/// and hands everyone else to the wrapped primary authenticator.
pub struct SecondFactorAuthenticator<A, D, S, T, C>
where
    A: PrimaryAuthenticator,
    D: UserDirectory,
    S: UserSettings,
    T: TokenStore,
    C: Clock,
{
    primary: A,
    directory: D,
    policy: EnrollmentPolicy<S>,
    token_store: T,
    clock: C,
    expiration: TimeDelta,
}

impl<A, D, S, T, C> SecondFactorAuthenticator<A, D, S, T, C>
where
    A: PrimaryAuthenticator,
    D: UserDirectory,
    S: UserSettings,
    T: TokenStore,
    C: Clock,
{
    pub fn new(
        primary: A,
        directory: D,
        policy: EnrollmentPolicy<S>,
        token_store: T,
        clock: C,
        expiration: TimeDelta,
    ) -> Self {
        Self {
            primary,
            directory,
            policy,
            token_store,
            clock,
            expiration,
        }
    }

    pub fn primary(&self) -> &A {
        &self.primary
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn policy(&self) -> &EnrollmentPolicy<S> {
        &self.policy
    }

    pub fn token_store(&self) -> &T {
        &self.token_store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn expiration(&self) -> TimeDelta {
        self.expiration
    }

    /// Whether logging in as `identity` goes through the second factor.
    /// Unknown identities are not enrolled.
    #[tracing::instrument(name = "SecondFactorAuthenticator::require_second_factor", skip(self))]
    pub async fn require_second_factor(
        &self,
        identity: &Identity,
    ) -> Result<bool, SecondFactorError> {
        match self.directory.find_by_identity(identity).await? {
            Some(user) => Ok(self.policy.require_second_factor(&user).await?),
            None => Ok(false),
        }
    }

    /// Check `code` for `identity`.
    ///
    /// Users who are not enrolled pass without a code. On success every
    /// outstanding token of the user is gone.
    #[tracing::instrument(name = "SecondFactorAuthenticator::verify_code", skip(self, code))]
    pub async fn verify_code(
        &self,
        identity: &Identity,
        code: Option<&str>,
    ) -> Result<AuthVerdict, SecondFactorError> {
        let Some(user) = self
            .directory
            .find_by_identity(identity)
            .await?
            .filter(User::is_active)
        else {
            return Ok(AuthVerdict::IdentityNotFound);
        };

        if !self.policy.require_second_factor(&user).await? {
            return Ok(AuthVerdict::Success(user));
        }

        self.check_code(user, code).await
    }

    async fn check_code(
        &self,
        user: User,
        code: Option<&str>,
    ) -> Result<AuthVerdict, SecondFactorError> {
        let Some(raw) = code.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Ok(AuthVerdict::CredentialInvalid(MISSING_CODE_MESSAGE.to_string()));
        };
        let Ok(code) = TwoFaCode::parse(raw) else {
            return Ok(AuthVerdict::CredentialInvalid(INVALID_CODE_MESSAGE.to_string()));
        };

        let cutoff = expiry_cutoff(self.clock.now(), self.expiration);
        let swept = self.token_store.sweep_expired(cutoff).await?;
        if swept > 0 {
            tracing::debug!(swept, "Expired second factor tokens removed");
        }

        match self.token_store.consume_match(user.id(), code, cutoff).await? {
            Some(_) => Ok(AuthVerdict::Success(user)),
            None => {
                tracing::info!(user_id = %user.id(), "Second factor code rejected");
                Ok(AuthVerdict::CredentialInvalid(INVALID_CODE_MESSAGE.to_string()))
            }
        }
    }
}

#[async_trait]
impl<A, D, S, T, C> PrimaryAuthenticator for SecondFactorAuthenticator<A, D, S, T, C>
where
    A: PrimaryAuthenticator,
    D: UserDirectory,
    S: UserSettings,
    T: TokenStore,
    C: Clock,
{
    /// For enrolled users the credential is the emailed code. Anyone else is
    /// forwarded to the wrapped authenticator and its verdict returned as is.
    async fn authenticate(
        &self,
        identity: &Identity,
        credential: &Credential,
    ) -> Result<AuthVerdict, AuthenticatorError> {
        let user = self
            .directory
            .find_by_identity(identity)
            .await
            .map_err(SecondFactorError::from)?;

        let enrolled = match &user {
            Some(user) => self
                .policy
                .require_second_factor(user)
                .await
                .map_err(SecondFactorError::from)?,
            None => false,
        };

        match user {
            Some(user) if enrolled => {
                if !user.is_active() {
                    return Ok(AuthVerdict::IdentityNotFound);
                }
                let code = credential.as_ref().expose_secret();
                Ok(self.check_code(user, Some(code)).await?)
            }
            _ => self.primary.authenticate(identity, credential).await,
        }
    }
}
