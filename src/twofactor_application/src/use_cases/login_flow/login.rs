use twofactor_core::{
    AuthVerdict, Clock, Credential, EmailClient, Identity, LoginObserver, LoginOutcome,
    LoginStep, LoginSubmission, PrimaryAuthenticator, Session, Step2Entry, TokenStore,
    TwoFactorError, UserDirectory, UserSettings, session_keys,
};

use super::{LoginFlowError, LoginOrchestrator, recover};

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
    /// Step 1. A submission carrying code fields goes straight to step 2.
    #[tracing::instrument(name = "LoginOrchestrator::login", skip_all)]
    pub(super) async fn step_credentials(
        &self,
        session: &mut Session,
        submission: LoginSubmission,
    ) -> LoginOutcome {
        if let Some(outcome) = self.already_authenticated(session) {
            return outcome;
        }
        if submission.carries_code() {
            return self
                .step_code(session, Step2Entry::Submission(submission.code))
                .await;
        }

        let (identity, credential) = match submission.validate() {
            Ok(fields) => fields,
            Err(errors) => {
                return LoginOutcome::InvalidForm {
                    step: LoginStep::Credentials,
                    errors,
                };
            }
        };

        // A new attempt replaces whatever an earlier one left behind.
        session.remove(session_keys::PENDING_IDENTITY);

        match self
            .authenticate_credentials(session, &identity, &credential)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => recover(LoginStep::Credentials, err),
        }
    }

    async fn authenticate_credentials(
        &self,
        session: &mut Session,
        identity: &Identity,
        credential: &Credential,
    ) -> Result<LoginOutcome, LoginFlowError> {
        let required = self.second_factor.require_second_factor(identity).await?;
        if required {
            session.regenerate_id();
        }

        let user = match self
            .second_factor
            .primary()
            .authenticate(identity, credential)
            .await?
        {
            AuthVerdict::Success(user) => user,
            AuthVerdict::IdentityNotFound => {
                tracing::info!("Login attempt for unknown identity");
                return Ok(LoginOutcome::failed(
                    LoginStep::Credentials,
                    TwoFactorError::IdentityNotFound,
                ));
            }
            AuthVerdict::CredentialInvalid(reason) => {
                tracing::info!(%reason, "Login attempt with invalid credential");
                return Ok(LoginOutcome::failed(
                    LoginStep::Credentials,
                    TwoFactorError::CredentialInvalid(reason),
                ));
            }
        };

        if !required {
            return Ok(self.finalize(session, &user, false).await);
        }

        let invalidated = self
            .second_factor
            .token_store()
            .invalidate_all(user.id())
            .await?;
        if invalidated > 0 {
            tracing::debug!(invalidated, "Previous second factor tokens dropped");
        }

        // Set before delivery so a failed send can be retried with a resend.
        session.insert(session_keys::PENDING_IDENTITY, user.identity().as_str());
        self.issue_and_deliver(&user).await?;

        Ok(self.step_code(session, Step2Entry::FirstArrival).await)
    }
}
