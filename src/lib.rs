//! # twofactor - email second factor for an existing login
//!
//! Facade crate re-exporting the public API of the workspace members.
//!
//! ## Structure
//!
//! - **Core domain types**: `Identity`, `Credential`, `TwoFaCode`, `Session`, `LoginOutcome`
//! - **Ports**: `UserDirectory`, `UserSettings`, `TokenStore`, `SessionStore`, `EmailClient`
//! - **Use cases**: `EnrollmentPolicy`, `SecondFactorAuthenticator`, `LoginOrchestrator`
//! - **Adapters**: in-memory and Postgres stores, Postmark client, session cookies, settings
//! - **Service**: `TwoFactorService`, the axum router for `/login`, `/login/token` and
//!   `/login/resend-token`

// ============================================================================
// Core Domain Types
// ============================================================================

pub mod core {
    pub use twofactor_core::*;
}

pub use twofactor_core::{
    Credential, Email, Identity, LoginOutcome, LoginStep, LoginSubmission, MessageTemplate,
    SecondFactorToken, Session, SessionId, Step2Entry, TwoFaCode, TwoFaError, TwoFactorError,
    User, UserError, UserId,
};

// ============================================================================
// Ports
// ============================================================================

pub mod ports {
    pub use twofactor_core::{
        Clock, EmailClient, LoginEvent, LoginObserver, SessionStore, SessionStoreError,
        SystemClock, TokenStore, TokenStoreError, UserDirectory, UserDirectoryError,
        UserSettings, UserSettingsError,
    };
}

pub use twofactor_core::{
    AuthVerdict, AuthenticatorError, EmailClient, LoginFlow, LoginObserver, PrimaryAuthenticator,
    SessionStore, TokenStore, UserDirectory, UserSettings,
};

// ============================================================================
// Use Cases (Application Layer)
// ============================================================================

pub mod use_cases {
    pub use twofactor_application::*;
}

pub use twofactor_application::{
    EnrollmentPolicy, LoginFlowConfig, LoginOrchestrator, SecondFactorAuthenticator,
    TokenDelivery,
};

// ============================================================================
// Adapters (Infrastructure)
// ============================================================================

pub mod adapters {
    /// Framework-agnostic HTTP handlers
    pub mod handlers {
        pub use twofactor_adapters::handlers::*;
    }

    pub mod persistence {
        pub use twofactor_adapters::persistence::*;
    }

    pub mod email {
        pub use twofactor_adapters::email::*;
    }

    pub mod observers {
        pub use twofactor_adapters::observers::*;
    }

    pub mod config {
        pub use twofactor_adapters::config::*;
    }

    pub use twofactor_adapters::{SessionCookieConfig, SessionManager};
}

pub use twofactor_adapters::{
    BroadcastLoginObserver, DashMapSessionStore, HashMapTokenStore, HashMapUserStore,
    MockEmailClient, PostgresTokenStore, PostgresUserStore, PostmarkEmailClient,
    RedisSessionStore, SessionManager, TracingLoginObserver,
};

// ============================================================================
// Axum Integration and Service
// ============================================================================

pub mod axum_routes {
    pub use twofactor_axum::*;
}

pub use twofactor_service::{
    TwoFactorService, build_login_flow, configure_postgresql, configure_postmark_email_client,
    configure_redis,
};

// ============================================================================
// Re-export common external dependencies
// ============================================================================

/// For implementing the ports
pub use async_trait::async_trait;

pub use secrecy::{ExposeSecret, Secret};
