use axum::{Form, extract::State, http::request::Parts, response::Response};
use secrecy::Secret;
use serde::Deserialize;
use twofactor_adapters::handlers;
use twofactor_core::{LoginFlow, LoginSubmission, SessionStore};

use super::LoginApiError;
use crate::{AxumRequest, LoginState, response_builder};

/// Fields posted to `/login`. The code fields are present when the form
/// already carries the second step.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<Secret<String>>,
    pub token_email: Option<String>,
    pub submit_token: Option<String>,
}

impl From<LoginForm> for LoginSubmission {
    fn from(form: LoginForm) -> Self {
        LoginSubmission {
            identity: form.email,
            credential: form.password,
            code: form.token_email,
            submit_code: form.submit_token.is_some(),
        }
    }
}

#[tracing::instrument(name = "Login", skip_all)]
pub async fn login<F, S>(
    State(state): State<LoginState<F, S>>,
    parts: Parts,
    Form(form): Form<LoginForm>,
) -> Result<Response, LoginApiError>
where
    F: LoginFlow,
    S: SessionStore + Clone + 'static,
{
    handlers::handle_login(
        &*state.flow,
        &state.sessions,
        &AxumRequest(parts),
        form.into(),
        response_builder(),
    )
    .await
    .map_err(LoginApiError::from)
}
