use serde_json::{Map, Value, json};
use twofactor_core::{
    AuthResponseBuilder, AuthResponseHelpers, FormErrors, LoginOutcome, LoginStep, TwoFactorError,
};

pub(crate) fn with_cookie<B: AuthResponseBuilder>(builder: B, cookie: Option<&str>) -> B {
    match cookie {
        Some(cookie) => builder.cookie(cookie),
        None => builder,
    }
}

/// `data` of a negative answer, shaped after the form the client has to show.
fn failure_data(step: LoginStep, message: &str) -> Value {
    match step {
        LoginStep::Credentials => json!({ "login": false, "message": message }),
        LoginStep::Code => json!({ "login": null, "token_email": message }),
    }
}

fn form_error_data(step: LoginStep, errors: &FormErrors) -> Value {
    match step {
        LoginStep::Credentials => {
            let fields: Map<String, Value> = errors
                .iter()
                .map(|error| (error.field.to_string(), Value::from(error.message)))
                .collect();
            json!({ "login": false, "errors": fields })
        }
        LoginStep::Code => {
            let message = errors.iter().next().map(|error| error.message);
            json!({ "login": null, "token_email": message })
        }
    }
}

fn flash_text(outcome: &LoginOutcome) -> Option<String> {
    outcome
        .flash_messages()
        .into_iter()
        .next()
        .map(|flash| flash.text)
}

pub(crate) fn outcome_response<B: AuthResponseBuilder>(
    builder: B,
    outcome: &LoginOutcome,
) -> B::Response {
    match outcome {
        LoginOutcome::AlreadyAuthenticated { redirect_to }
        | LoginOutcome::Authenticated { redirect_to, .. } => {
            builder.jsend_success(json!({ "login": true, "redirect_url": redirect_to }))
        }
        LoginOutcome::AwaitingSecondFactor => {
            builder.jsend_success(json!({ "login": null, "token_email": null }))
        }
        LoginOutcome::CodeResent => builder.jsend_success(json!({
            "login": null,
            "token_email": null,
            "message": flash_text(outcome),
        })),
        LoginOutcome::InvalidForm { step, errors } => {
            builder.jsend_fail(form_error_data(*step, errors))
        }
        LoginOutcome::Failed { step, error }
            if error.is_client_error() || *error == TwoFactorError::SessionStateLost =>
        {
            let message = flash_text(outcome).unwrap_or_default();
            builder.jsend_fail(failure_data(*step, &message))
        }
        LoginOutcome::Failed { .. } => builder.jsend_error(flash_text(outcome).as_deref(), None),
    }
}
