//! Framework-agnostic login handlers.
//!
//! Each handler loads the session named by the request cookie, runs one entry
//! point of the login flow on it, writes the session back and answers with a
//! JSend envelope. Framework-specific routes (Axum, ...) extract the form,
//! call these handlers and convert the result back to a framework response.

pub mod login;
pub mod login_token;
pub mod resend_token;
mod response;

pub use login::handle_login;
pub use login_token::handle_login_token;
pub use resend_token::{RESEND_FAILED_MESSAGE, handle_resend_token};

#[cfg(test)]
pub(crate) mod test_support;
