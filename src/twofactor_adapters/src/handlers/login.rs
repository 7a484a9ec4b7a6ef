//! Framework-agnostic handler for `POST /login`.

use twofactor_core::{AuthRequest, AuthResponseBuilder, LoginFlow, LoginSubmission, SessionStore};

use super::response::{outcome_response, with_cookie};
use crate::session::SessionManager;

/// Handle a login form post.
///
/// Runs step 1, or step 2 when the form carries the code fields.
///
/// # Example
///
/// ```ignore
/// pub async fn login(
///     State(state): State<LoginState<F, S>>,
///     parts: request::Parts,
///     Form(form): Form<LoginForm>,
/// ) -> Result<Response, LoginApiError> {
///     handle_login(&*state.flow, &state.sessions, &AxumRequest(parts), form.into(), response_builder())
///         .await
///         .map_err(LoginApiError::from)
/// }
/// ```
pub async fn handle_login<F, S, R, B>(
    flow: &F,
    sessions: &SessionManager<S>,
    req: &R,
    submission: LoginSubmission,
    builder: B,
) -> Result<B::Response, String>
where
    F: LoginFlow,
    S: SessionStore,
    R: AuthRequest,
    B: AuthResponseBuilder,
{
    let mut session = sessions.load(req).await.map_err(|e| e.to_string())?;

    let outcome = flow.login(&mut session, submission).await;

    let cookie = sessions
        .commit(&mut session)
        .await
        .map_err(|e| e.to_string())?;
    Ok(outcome_response(
        with_cookie(builder, cookie.as_deref()),
        &outcome,
    ))
}
