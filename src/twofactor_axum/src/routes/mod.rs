//! Axum login routes.
//!
//! Each route extracts its input with Axum's extractors, calls the
//! framework-agnostic handler and turns its error into a JSend error.

pub mod error;
pub mod login;
pub mod login_token;
pub mod resend_token;

pub use error::LoginApiError;
pub use login::{LoginForm, login};
pub use login_token::{TokenForm, login_token};
pub use resend_token::{ResendQuery, resend_token};
