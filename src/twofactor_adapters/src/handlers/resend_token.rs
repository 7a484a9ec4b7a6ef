//! Framework-agnostic handler for `/login/resend-token`.

use serde_json::json;
use twofactor_core::{
    AuthRequest, AuthResponseBuilder, AuthResponseHelpers, LoginFlow, LoginOutcome, SessionStore,
};

use super::response::{outcome_response, with_cookie};
use crate::session::SessionManager;

pub const RESEND_FAILED_MESSAGE: &str = "Unable to send email.";

/// Send another code for the login pending in the session. Only acts when the
/// `resend_token` flag was set on the request.
pub async fn handle_resend_token<F, S, R, B>(
    flow: &F,
    sessions: &SessionManager<S>,
    req: &R,
    resend_requested: bool,
    builder: B,
) -> Result<B::Response, String>
where
    F: LoginFlow,
    S: SessionStore,
    R: AuthRequest,
    B: AuthResponseBuilder,
{
    if !resend_requested {
        return Ok(builder.jsend_error(Some(RESEND_FAILED_MESSAGE), Some(json!({}))));
    }

    let mut session = sessions.load(req).await.map_err(|e| e.to_string())?;

    let outcome = flow.resend_token(&mut session).await;

    let cookie = sessions
        .commit(&mut session)
        .await
        .map_err(|e| e.to_string())?;
    let builder = with_cookie(builder, cookie.as_deref());
    Ok(match outcome {
        LoginOutcome::CodeResent
        | LoginOutcome::Authenticated { .. }
        | LoginOutcome::AlreadyAuthenticated { .. } => outcome_response(builder, &outcome),
        _ => builder.jsend_error(Some(RESEND_FAILED_MESSAGE), Some(json!({}))),
    })
}
