use secrecy::Secret;
use serde_json::Value;
use tokio::sync::broadcast;
use twofactor_adapters::{
    BroadcastLoginObserver, DashMapSessionStore, HashMapTokenStore, HashMapUserStore,
    MockEmailClient, SessionManager,
    config::{AppSettings, test},
};
use twofactor_core::{Email, Identity, LoginEvent, User, UserId};
use twofactor_service::{TwoFactorService, build_login_flow};

pub const PASSWORD: &str = "correct horse";
pub const ENROLLED: &str = "alice@example.com";
pub const PLAIN: &str = "bob@example.com";

pub struct TestApp {
    pub address: String,
    pub http_client: reqwest::Client,
    pub email_client: MockEmailClient,
    pub tokens: HashMapTokenStore,
    pub users: HashMapUserStore,
    pub enrolled_id: UserId,
    pub logins: broadcast::Receiver<LoginEvent>,
}

fn settings() -> AppSettings {
    AppSettings::from_builder(
        AppSettings::defaults()
            .unwrap()
            .set_override("application.address", test::APP_ADDRESS)
            .unwrap()
            .set_override("twofactor.landing_path", "/account")
            .unwrap()
            .set_override("twofactor.message.body", "{token}")
            .unwrap()
            .set_override("session.secure_cookie", false)
            .unwrap(),
    )
    .unwrap()
}

pub fn user(identity: &str) -> User {
    User::new(
        UserId::new(),
        Identity::parse(identity).unwrap(),
        Email::parse(Secret::new(identity.to_string())).unwrap(),
        "Test".to_string(),
        true,
    )
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap()
}

pub struct ClientView<'a> {
    app: &'a TestApp,
    http_client: reqwest::Client,
}

impl ClientView<'_> {
    pub async fn post_credentials(&self, email: &str, password: &str) -> reqwest::Response {
        self.http_client
            .post(format!("{}/login", self.app.address))
            .form(&[("email", email), ("password", password)])
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_login_token(&self, code: &str) -> reqwest::Response {
        self.http_client
            .post(format!("{}/login/token", self.app.address))
            .form(&[("token_email", code)])
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn last_code(&self, recipient: &str) -> String {
        self.app.last_code(recipient).await
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let settings = settings();

        let users = HashMapUserStore::new();
        let enrolled = user(ENROLLED);
        let enrolled_id = *enrolled.id();
        users
            .add_user(enrolled, Secret::new(PASSWORD.to_string()), true)
            .await;
        users
            .add_user(user(PLAIN), Secret::new(PASSWORD.to_string()), false)
            .await;

        let tokens = HashMapTokenStore::new();
        let email_client = MockEmailClient::new();
        let observer = BroadcastLoginObserver::new(16);
        let logins = observer.subscribe();

        let flow = build_login_flow(
            &settings,
            users.clone(),
            tokens.clone(),
            email_client.clone(),
            observer,
        );
        let sessions = SessionManager::new(
            DashMapSessionStore::new(settings.session_ttl()),
            settings.cookie_config(),
        );
        let service = TwoFactorService::new(flow, sessions);

        let listener = tokio::net::TcpListener::bind(&settings.application.address)
            .await
            .unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());

        let _ = tokio::spawn(service.run_standalone(listener, None));

        let http_client = http_client();

        Self {
            address,
            http_client,
            email_client,
            tokens,
            users,
            enrolled_id,
            logins,
        }
    }

    /// Same server and stores, separate cookie jar.
    pub fn with_new_client(&self) -> ClientView<'_> {
        ClientView {
            app: self,
            http_client: http_client(),
        }
    }

    pub async fn post_login(&self, form: &[(&str, &str)]) -> reqwest::Response {
        self.http_client
            .post(format!("{}/login", self.address))
            .form(form)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_credentials(&self, email: &str, password: &str) -> reqwest::Response {
        self.post_login(&[("email", email), ("password", password)])
            .await
    }

    pub async fn post_login_token(&self, code: &str) -> reqwest::Response {
        self.http_client
            .post(format!("{}/login/token", self.address))
            .form(&[("token_email", code)])
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_resend_token(&self, query: &str) -> reqwest::Response {
        self.http_client
            .get(format!("{}/login/resend-token{}", self.address, query))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// The code from the latest mail sent to `recipient`.
    pub async fn last_code(&self, recipient: &str) -> String {
        self.email_client
            .last_sent_to(recipient)
            .await
            .expect("No email was sent")
            .content
            .trim()
            .to_string()
    }
}

pub async fn json(response: reqwest::Response) -> Value {
    response.json().await.expect("Response is not JSON")
}
