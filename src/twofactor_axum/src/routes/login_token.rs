use axum::{Form, extract::State, http::request::Parts, response::Response};
use serde::Deserialize;
use twofactor_adapters::handlers;
use twofactor_core::{LoginFlow, SessionStore};

use super::LoginApiError;
use crate::{AxumRequest, LoginState, response_builder};

#[derive(Debug, Default, Deserialize)]
pub struct TokenForm {
    pub token_email: Option<String>,
}

#[tracing::instrument(name = "Login token", skip_all)]
pub async fn login_token<F, S>(
    State(state): State<LoginState<F, S>>,
    parts: Parts,
    Form(form): Form<TokenForm>,
) -> Result<Response, LoginApiError>
where
    F: LoginFlow,
    S: SessionStore + Clone + 'static,
{
    handlers::handle_login_token(
        &*state.flow,
        &state.sessions,
        &AxumRequest(parts),
        form.token_email,
        response_builder(),
    )
    .await
    .map_err(LoginApiError::from)
}
