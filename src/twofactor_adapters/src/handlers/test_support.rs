use chrono::TimeDelta;
use secrecy::Secret;
use serde_json::Value;
use twofactor_application::{
    EnrollmentPolicy, LoginFlowConfig, LoginOrchestrator, SecondFactorAuthenticator, SiteInfo,
    TokenDelivery,
};
use twofactor_core::{
    AuthRequest, AuthResponseBuilder, Email, Identity, LoginSubmission, MessageTemplate,
    SystemClock, TwoFaCode, User, UserId,
};

use super::handle_login;
use crate::{
    email::MockEmailClient,
    observers::TracingLoginObserver,
    persistence::{DashMapSessionStore, HashMapTokenStore, HashMapUserStore},
    session::{SessionCookieConfig, SessionManager},
};

#[derive(Debug, Default)]
pub struct TestRequest {
    cookie: Option<String>,
}

impl TestRequest {
    pub fn session_id(&self) -> &str {
        self.cookie.as_deref().unwrap_or_default()
    }
}

impl AuthRequest for TestRequest {
    fn header(&self, _name: &str) -> Option<&str> {
        None
    }

    fn cookie(&self, _name: &str) -> Option<&str> {
        self.cookie.as_deref()
    }

    fn method(&self) -> &str {
        "POST"
    }

    fn path(&self) -> &str {
        "/login"
    }
}

#[derive(Debug, Default)]
pub struct RecordingBuilder {
    status: u16,
    headers: Vec<(String, String)>,
    body: Value,
}

#[derive(Debug)]
pub struct RecordedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl RecordedResponse {
    pub fn set_cookie(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name == "set-cookie")
            .map(|(_, value)| value.as_str())
    }
}

impl AuthResponseBuilder for RecordingBuilder {
    type Response = RecordedResponse;

    fn status(mut self, code: u16) -> Self {
        self.status = code;
        self
    }

    fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    fn json_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    fn build(self) -> Self::Response {
        RecordedResponse {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

pub type TestFlow = LoginOrchestrator<
    HashMapUserStore,
    HashMapUserStore,
    HashMapUserStore,
    HashMapTokenStore,
    SystemClock,
    MockEmailClient,
    TracingLoginObserver,
>;

pub struct TestApp {
    pub flow: TestFlow,
    pub sessions: SessionManager<DashMapSessionStore>,
    pub tokens: HashMapTokenStore,
    pub email_client: MockEmailClient,
    pub enrolled_id: UserId,
}

fn user(identity: &str) -> User {
    User::new(
        UserId::new(),
        Identity::parse(identity).unwrap(),
        Email::parse(Secret::new(identity.to_string())).unwrap(),
        "Test".to_string(),
        true,
    )
}

/// `plain@example.com` and `enrolled@example.com`, both with password
/// `password`; only the second one is enrolled.
pub async fn app() -> TestApp {
    let users = HashMapUserStore::new();
    let plain = user("plain@example.com");
    let enrolled = user("enrolled@example.com");
    let enrolled_id = *enrolled.id();
    users
        .add_user(plain, Secret::new("password".to_string()), false)
        .await;
    users
        .add_user(enrolled, Secret::new("password".to_string()), true)
        .await;

    let tokens = HashMapTokenStore::new();
    let email_client = MockEmailClient::new();
    let second_factor = SecondFactorAuthenticator::new(
        users.clone(),
        users.clone(),
        EnrollmentPolicy::new(users, false),
        tokens.clone(),
        SystemClock,
        TimeDelta::seconds(1200),
    );
    let flow = LoginOrchestrator::new(
        second_factor,
        TokenDelivery::new(
            email_client.clone(),
            MessageTemplate::default(),
            SiteInfo::default(),
        ),
        TracingLoginObserver,
        LoginFlowConfig::default(),
    );
    let sessions = SessionManager::new(
        DashMapSessionStore::new(TimeDelta::minutes(30)),
        SessionCookieConfig {
            cookie_name: "session".to_string(),
            secure: false,
        },
    );

    TestApp {
        flow,
        sessions,
        tokens,
        email_client,
        enrolled_id,
    }
}

impl TestApp {
    /// Pass step 1 as the enrolled user. Returns a request carrying the session
    /// cookie and the code that was sent.
    pub async fn pending_login(&self) -> (TestRequest, TwoFaCode) {
        let response = handle_login(
            &self.flow,
            &self.sessions,
            &TestRequest::default(),
            LoginSubmission {
                identity: Some("enrolled@example.com".to_string()),
                credential: Some(Secret::new("password".to_string())),
                ..Default::default()
            },
            RecordingBuilder::default(),
        )
        .await
        .unwrap();

        let session_id = response
            .set_cookie()
            .and_then(|cookie| cookie.split(';').next())
            .and_then(|pair| pair.split_once('='))
            .map(|(_, value)| value.to_string())
            .unwrap();
        let code = self.tokens.tokens_of(&self.enrolled_id).await[0].code();

        (
            TestRequest {
                cookie: Some(session_id),
            },
            code,
        )
    }
}
