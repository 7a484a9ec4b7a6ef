pub mod domain;
pub mod http_abstraction;
pub mod ports;
pub mod strategies;

// Re-export commonly used types for convenience
pub use domain::{
    credential::Credential,
    email::Email,
    identity::Identity,
    login::{
        CODE_FIELD, CREDENTIAL_FIELD, FieldError, FlashLevel, FlashMessage, FormErrors,
        IDENTITY_FIELD, LoginOutcome, LoginStep, LoginSubmission, Step2Entry, TwoFactorError,
    },
    message_template::{MessageContext, MessageTemplate, RenderedMessage},
    session::{Session, SessionId, keys as session_keys},
    token::{SecondFactorToken, TokenId, expiry_cutoff},
    two_fa_code::TwoFaCode,
    two_fa_error::TwoFaError,
    user::{User, UserError, UserId},
};

pub use ports::{
    clock::{Clock, ManualClock, SystemClock},
    repositories::{
        SessionStore, SessionStoreError, TokenStore, TokenStoreError, UserDirectory,
        UserDirectoryError, UserSettings, UserSettingsError,
    },
    services::{EmailClient, LoginEvent, LoginObserver},
};

pub use strategies::{
    authenticator::{AuthVerdict, AuthenticatorError, PrimaryAuthenticator},
    login_flow::LoginFlow,
};

pub use http_abstraction::{AuthRequest, AuthResponseBuilder, AuthResponseHelpers};
