use async_trait::async_trait;

use crate::domain::{
    login::{LoginOutcome, LoginSubmission, Step2Entry},
    session::Session,
};

/// The two-step login state machine as seen by an HTTP layer.
///
/// Every call receives the request's session handle explicitly; implementations
/// keep no per-login state of their own. Authentication failures are reported
/// as outcomes, never as panics or errors.
#[async_trait]
pub trait LoginFlow: Send + Sync + 'static {
    /// First step: identity and primary credential (or a combined form that
    /// already carries the code).
    async fn login(&self, session: &mut Session, submission: LoginSubmission) -> LoginOutcome;

    /// Second step: the emailed code.
    async fn login_token(&self, session: &mut Session, entry: Step2Entry) -> LoginOutcome;

    /// Send a new code for the pending login.
    async fn resend_token(&self, session: &mut Session) -> LoginOutcome;
}
