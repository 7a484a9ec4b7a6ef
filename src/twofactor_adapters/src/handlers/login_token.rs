//! Framework-agnostic handler for `POST /login/token`.

use twofactor_core::{AuthRequest, AuthResponseBuilder, LoginFlow, SessionStore, Step2Entry};

use super::response::{outcome_response, with_cookie};
use crate::session::SessionManager;

/// Handle a posted code for the login pending in the session.
pub async fn handle_login_token<F, S, R, B>(
    flow: &F,
    sessions: &SessionManager<S>,
    req: &R,
    code: Option<String>,
    builder: B,
) -> Result<B::Response, String>
where
    F: LoginFlow,
    S: SessionStore,
    R: AuthRequest,
    B: AuthResponseBuilder,
{
    let mut session = sessions.load(req).await.map_err(|e| e.to_string())?;

    let outcome = flow
        .login_token(&mut session, Step2Entry::Submission(code))
        .await;

    let cookie = sessions
        .commit(&mut session)
        .await
        .map_err(|e| e.to_string())?;
    Ok(outcome_response(
        with_cookie(builder, cookie.as_deref()),
        &outcome,
    ))
}
