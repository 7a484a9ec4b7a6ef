//! Standalone HTTP service for the two-factor login flow.

pub mod helpers;
pub mod login_service;
mod tracing;

pub use helpers::{
    ServiceLoginFlow, SetupError, build_login_flow, configure_postgresql,
    configure_postmark_email_client, configure_redis,
};
pub use login_service::TwoFactorService;
