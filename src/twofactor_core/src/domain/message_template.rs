use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is a valid regex"));

pub const DEFAULT_SUBJECT: &str = "[{main_title}] {token} is your code to log in";
pub const DEFAULT_BODY: &str = "Hi {user_name},

Someone, probably you, signed in to {main_title} ({main_url}) with {user_email}.

Enter this code to complete the login: {token}

The code is valid for a few minutes. If you did not try to log in, change your password.
";

/// Subject and body of the email carrying the code.
///
/// Placeholders: `{main_title}`, `{main_url}`, `{user_email}`, `{user_name}`,
/// `{token}`. Unknown placeholders are left as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub subject: String,
    pub body: String,
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self {
            subject: DEFAULT_SUBJECT.to_string(),
            body: DEFAULT_BODY.to_string(),
        }
    }
}

/// Values substituted into a `MessageTemplate`.
#[derive(Debug, Clone, Copy)]
pub struct MessageContext<'a> {
    pub main_title: &'a str,
    pub main_url: &'a str,
    pub user_email: &'a str,
    pub user_name: &'a str,
    pub token: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub subject: String,
    pub body: String,
}

impl MessageTemplate {
    pub fn render(&self, context: &MessageContext<'_>) -> RenderedMessage {
        RenderedMessage {
            subject: substitute(&self.subject, context),
            body: substitute(&self.body, context),
        }
    }
}

fn substitute(text: &str, context: &MessageContext<'_>) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &Captures<'_>| {
            match &caps[1] {
                "main_title" => context.main_title,
                "main_url" => context.main_url,
                "user_email" => context.user_email,
                "user_name" => context.user_name,
                "token" => context.token,
                _ => return caps[0].to_string(),
            }
            .to_string()
        })
        .into_owned()
}
