use axum::{
    extract::{Query, State},
    http::request::Parts,
    response::Response,
};
use serde::Deserialize;
use twofactor_adapters::handlers;
use twofactor_core::{LoginFlow, SessionStore};

use super::LoginApiError;
use crate::{AxumRequest, LoginState, response_builder};

#[derive(Debug, Default, Deserialize)]
pub struct ResendQuery {
    pub resend_token: Option<String>,
}

impl ResendQuery {
    /// `?resend_token=1` or any other non-empty value except `0`.
    pub fn is_requested(&self) -> bool {
        self.resend_token
            .as_deref()
            .map(str::trim)
            .is_some_and(|flag| !flag.is_empty() && flag != "0")
    }
}

#[tracing::instrument(name = "Resend token", skip_all)]
pub async fn resend_token<F, S>(
    State(state): State<LoginState<F, S>>,
    parts: Parts,
    Query(query): Query<ResendQuery>,
) -> Result<Response, LoginApiError>
where
    F: LoginFlow,
    S: SessionStore + Clone + 'static,
{
    handlers::handle_resend_token(
        &*state.flow,
        &state.sessions,
        &AxumRequest(parts),
        query.is_requested(),
        response_builder(),
    )
    .await
    .map_err(LoginApiError::from)
}
