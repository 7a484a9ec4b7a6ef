use twofactor_core::{
    Clock, EmailClient, LoginObserver, LoginOutcome, LoginStep, PrimaryAuthenticator, Session,
    TokenStore, TwoFactorError, UserDirectory, UserSettings, session_keys,
};

use super::{LoginOrchestrator, recover};

impl<A, D, S, T, C, E, O> LoginOrchestrator<A, D, S, T, C, E, O>
where
    A: PrimaryAuthenticator,
    D: UserDirectory,
    S: UserSettings,
    T: TokenStore,
    C: Clock,
    E: EmailClient,
    O: LoginObserver,
{
    /// Send another code for the pending login. Codes sent earlier stay valid.
    #[tracing::instrument(name = "LoginOrchestrator::resend_token", skip_all)]
    pub(super) async fn resend(&self, session: &mut Session) -> LoginOutcome {
        if let Some(outcome) = self.already_authenticated(session) {
            return outcome;
        }

        let Some(identity) = self.pending_identity(session) else {
            session.remove(session_keys::PENDING_IDENTITY);
            return LoginOutcome::failed(LoginStep::Credentials, TwoFactorError::SessionStateLost);
        };

        let user = match self.second_factor.directory().find_by_identity(&identity).await {
            Ok(Some(user)) if user.is_active() => user,
            Ok(_) => {
                session.remove(session_keys::PENDING_IDENTITY);
                return LoginOutcome::failed(
                    LoginStep::Credentials,
                    TwoFactorError::IdentityNotFound,
                );
            }
            Err(err) => return recover(LoginStep::Code, err.into()),
        };

        match self.issue_and_deliver(&user).await {
            Ok(()) => {
                tracing::info!(user_id = %user.id(), "Second factor code resent");
                LoginOutcome::CodeResent
            }
            Err(err) => recover(LoginStep::Code, err),
        }
    }
}
