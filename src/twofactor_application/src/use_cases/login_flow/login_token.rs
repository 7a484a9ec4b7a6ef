use twofactor_core::{
    AuthVerdict, CODE_FIELD, Clock, EmailClient, FormErrors, LoginObserver, LoginOutcome,
    LoginStep, PrimaryAuthenticator, Session, Step2Entry, TokenStore, TwoFaCode,
    TwoFactorError, UserDirectory, UserSettings, session_keys,
};

use super::{LoginOrchestrator, recover};

/// Check the code form. The value itself is only compared later.
fn validate_code_field(raw: Option<&str>) -> Result<&str, FormErrors> {
    let mut errors = FormErrors::default();
    match raw.map(str::trim) {
        None | Some("") => errors.push(CODE_FIELD, "Value is required and can't be empty"),
        Some(code) if TwoFaCode::parse(code).is_err() => {
            errors.push(CODE_FIELD, "The input must be a number between 0 and 9999")
        }
        Some(code) => return Ok(code),
    }
    Err(errors)
}

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
    /// Step 2. Without a pending identity in the session there is nothing to
    /// verify and the user is sent back to step 1.
    #[tracing::instrument(name = "LoginOrchestrator::login_token", skip_all)]
    pub(super) async fn step_code(&self, session: &mut Session, entry: Step2Entry) -> LoginOutcome {
        if let Some(outcome) = self.already_authenticated(session) {
            return outcome;
        }

        let Some(identity) = self.pending_identity(session) else {
            session.remove(session_keys::PENDING_IDENTITY);
            tracing::info!("Code submitted without a pending login");
            return LoginOutcome::failed(LoginStep::Credentials, TwoFactorError::SessionStateLost);
        };

        let raw = match entry {
            Step2Entry::FirstArrival => return LoginOutcome::AwaitingSecondFactor,
            Step2Entry::Submission(raw) => raw,
        };

        let code = match validate_code_field(raw.as_deref()) {
            Ok(code) => code,
            Err(errors) => {
                return LoginOutcome::InvalidForm {
                    step: LoginStep::Code,
                    errors,
                };
            }
        };

        match self.second_factor.verify_code(&identity, Some(code)).await {
            Ok(AuthVerdict::Success(user)) => self.finalize(session, &user, true).await,
            Ok(AuthVerdict::IdentityNotFound) => {
                session.remove(session_keys::PENDING_IDENTITY);
                LoginOutcome::failed(LoginStep::Credentials, TwoFactorError::IdentityNotFound)
            }
            Ok(AuthVerdict::CredentialInvalid(reason)) => {
                LoginOutcome::failed(LoginStep::Code, TwoFactorError::CredentialInvalid(reason))
            }
            Err(err) => recover(LoginStep::Code, err.into()),
        }
    }
}
