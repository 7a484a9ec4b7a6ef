use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{credential::Credential, identity::Identity, user::User};

// ============================================================================
// Primary Authenticator - the delegate the second factor stands in front of
// ============================================================================

/// Verdict of an authentication attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthVerdict {
    /// The credential is valid for the resolved user.
    Success(User),
    /// No usable account exists for the identity.
    IdentityNotFound,
    /// The account exists but the credential does not match.
    CredentialInvalid(String),
}

impl AuthVerdict {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Infrastructure failure while checking a credential. Distinct from a negative
/// verdict: it says nothing about the credential itself.
#[derive(Debug, Error)]
pub enum AuthenticatorError {
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Checks an identity and a credential.
///
/// The host's own authenticator (password check, API key check...) implements
/// this, and so does the second-factor authenticator, which wraps any other
/// implementation and forwards to it unchanged for users who are not enrolled.
/// Wrappers therefore chain freely.
#[async_trait]
pub trait PrimaryAuthenticator: Send + Sync {
    async fn authenticate(
        &self,
        identity: &Identity,
        credential: &Credential,
    ) -> Result<AuthVerdict, AuthenticatorError>;
}
