//! Inputs and outcomes of the two-step login flow.

use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use thiserror::Error;

use super::{credential::Credential, identity::Identity};

/// Which form the user has to be shown next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginStep {
    /// Identity and primary credential.
    Credentials,
    /// The emailed code.
    Code,
}

/// Why a login attempt did not move forward.
///
/// `IdentityNotFound` and `CredentialInvalid` share their user-facing message so
/// callers cannot tell which factor failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TwoFactorError {
    #[error("Identity not found")]
    IdentityNotFound,
    #[error("Invalid credential: {0}")]
    CredentialInvalid(String),
    #[error("Failed to deliver the code: {0}")]
    DeliveryFailed(String),
    #[error("Pending login missing from session")]
    SessionStateLost,
    #[error("Unexpected error: {0}")]
    Internal(String),
}

impl TwoFactorError {
    /// Message shown to the user for a failure at `step`. Never includes detail
    /// carried by the error itself.
    pub fn user_message(&self, step: LoginStep) -> &'static str {
        match (self, step) {
            (Self::IdentityNotFound | Self::CredentialInvalid(_), LoginStep::Credentials) => {
                "Email or password is invalid."
            }
            (Self::IdentityNotFound | Self::CredentialInvalid(_), LoginStep::Code) => {
                "Invalid code."
            }
            (Self::DeliveryFailed(_), _) => "Unable to send email. Please try again later.",
            (Self::SessionStateLost, _) => "Your login session expired. Please log in again.",
            (Self::Internal(_), _) => "An internal error has occurred.",
        }
    }

    /// Whether the failure is the client's to fix (bad input) rather than a fault
    /// on the server side.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::IdentityNotFound | Self::CredentialInvalid(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

/// User-facing message surfaced alongside an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
}

impl FlashMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(Vec<FieldError>);

impl FormErrors {
    pub fn push(&mut self, field: &'static str, message: &'static str) {
        self.0.push(FieldError { field, message });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

pub const IDENTITY_FIELD: &str = "email";
pub const CREDENTIAL_FIELD: &str = "password";
pub const CODE_FIELD: &str = "token_email";

/// Raw submission received by the login entry point.
///
/// A single form may carry the credential fields, the code fields, or both; a
/// submission carrying a code is routed to the second step.
#[derive(Debug, Clone, Default)]
pub struct LoginSubmission {
    pub identity: Option<String>,
    pub credential: Option<Secret<String>>,
    pub code: Option<String>,
    pub submit_code: bool,
}

impl LoginSubmission {
    pub fn carries_code(&self) -> bool {
        self.submit_code || self.code.as_deref().is_some_and(|code| !code.trim().is_empty())
    }

    /// Check the credential form. Nothing is looked up yet.
    pub fn validate(&self) -> Result<(Identity, Credential), FormErrors> {
        let mut errors = FormErrors::default();

        let identity = match self.identity.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push(IDENTITY_FIELD, "Value is required and can't be empty");
                None
            }
            Some(raw) => match Identity::parse(raw) {
                Ok(identity) => Some(identity),
                Err(_) => {
                    errors.push(IDENTITY_FIELD, "The input is not a valid login identifier");
                    None
                }
            },
        };

        let credential = match &self.credential {
            Some(raw) if !raw.expose_secret().is_empty() => Credential::parse(raw.clone()).ok(),
            _ => {
                errors.push(CREDENTIAL_FIELD, "Value is required and can't be empty");
                None
            }
        };

        match (identity, credential) {
            (Some(identity), Some(credential)) => Ok((identity, credential)),
            _ => Err(errors),
        }
    }
}

/// How the second step is entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step2Entry {
    /// Forwarded from a successful first step within the same request: show the
    /// code form without validating anything.
    FirstArrival,
    /// The user posted the code form.
    Submission(Option<String>),
}

/// Decision returned by every login entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The session was authenticated before this request.
    AlreadyAuthenticated { redirect_to: String },
    /// The login completed during this request.
    Authenticated {
        identity: Identity,
        redirect_to: String,
    },
    /// A code was sent; the code form has to be shown.
    AwaitingSecondFactor,
    /// A new code was sent for the pending login.
    CodeResent,
    /// The submitted form is incomplete or malformed. Nothing changed.
    InvalidForm { step: LoginStep, errors: FormErrors },
    /// The attempt failed; `step` is the form to show again.
    Failed { step: LoginStep, error: TwoFactorError },
}

impl LoginOutcome {
    pub fn failed(step: LoginStep, error: TwoFactorError) -> Self {
        Self::Failed { step, error }
    }

    /// Messages to surface to the user for this outcome.
    pub fn flash_messages(&self) -> Vec<FlashMessage> {
        match self {
            Self::CodeResent => vec![FlashMessage::success("A new code was resent.")],
            Self::Failed { step, error } => vec![FlashMessage::error(error.user_message(*step))],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(identity: Option<&str>, credential: Option<&str>) -> LoginSubmission {
        LoginSubmission {
            identity: identity.map(str::to_string),
            credential: credential.map(|c| Secret::new(c.to_string())),
            ..Default::default()
        }
    }

    #[test]
    fn complete_form_validates() {
        let (identity, _) = submission(Some("a@example.com"), Some("hunter2"))
            .validate()
            .unwrap();
        assert_eq!(identity.as_str(), "a@example.com");
    }

    #[test]
    fn missing_fields_are_reported_per_field() {
        let errors = submission(Some("  "), None).validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec![IDENTITY_FIELD, CREDENTIAL_FIELD]);
    }

    #[test]
    fn code_fields_route_to_second_step() {
        let mut form = submission(None, None);
        assert!(!form.carries_code());
        form.code = Some("   ".to_string());
        assert!(!form.carries_code());
        form.code = Some("1234".to_string());
        assert!(form.carries_code());
        form.code = None;
        form.submit_code = true;
        assert!(form.carries_code());
    }

    #[test]
    fn failure_messages_do_not_reveal_the_failing_factor() {
        let unknown = TwoFactorError::IdentityNotFound;
        let wrong = TwoFactorError::CredentialInvalid("Invalid or expired code.".into());
        for step in [LoginStep::Credentials, LoginStep::Code] {
            assert_eq!(unknown.user_message(step), wrong.user_message(step));
        }
        let delivery = TwoFactorError::DeliveryFailed("smtp timeout".into());
        assert!(!delivery.user_message(LoginStep::Credentials).contains("smtp"));
    }
}
