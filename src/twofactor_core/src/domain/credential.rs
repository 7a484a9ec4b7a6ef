use secrecy::{ExposeSecret, Secret};

use super::user::UserError;

/// Primary credential as submitted by the user (a password, an API key...).
///
/// The core never inspects it beyond checking it is present; it is handed
/// unchanged to the primary authenticator.
#[derive(Debug, Clone)]
pub struct Credential(Secret<String>);

impl Credential {
    pub fn parse(raw: Secret<String>) -> Result<Self, UserError> {
        if raw.expose_secret().is_empty() {
            return Err(UserError::MissingCredential);
        }
        Ok(Self(raw))
    }
}

impl TryFrom<Secret<String>> for Credential {
    type Error = UserError;

    fn try_from(value: Secret<String>) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl AsRef<Secret<String>> for Credential {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}
