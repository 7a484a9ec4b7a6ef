use std::fmt;

use super::user::UserError;

const MAX_IDENTITY_LENGTH: usize = 254;

/// Unique login identifier of a user (an email address or a user name).
///
/// This is the only piece of a login attempt that is kept in the session between
/// the two steps, so it must never carry anything secret.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    pub fn parse(raw: &str) -> Result<Self, UserError> {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.chars().count() > MAX_IDENTITY_LENGTH
            || trimmed.chars().any(char::is_control)
        {
            return Err(UserError::InvalidIdentity);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Identity {
    type Error = UserError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
