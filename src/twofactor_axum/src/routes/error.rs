use axum::response::{IntoResponse, Response};
use thiserror::Error;
use twofactor_core::AuthResponseHelpers;

use crate::adapters::response_builder;

/// Failures the login routes cannot express as a login outcome, such as an
/// unreachable session store.
#[derive(Debug, Error)]
pub enum LoginApiError {
    #[error("Session handling failed: {0}")]
    Session(String),
}

impl From<String> for LoginApiError {
    fn from(reason: String) -> Self {
        LoginApiError::Session(reason)
    }
}

impl IntoResponse for LoginApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Login request failed");
        response_builder().jsend_error(None, None)
    }
}
