use std::sync::Arc;

use redis::{Client, RedisResult};
use reqwest::Client as HttpClient;
use secrecy::{ExposeSecret, Secret};
use sqlx::{PgPool, postgres::PgPoolOptions};
use thiserror::Error;
use tokio::sync::RwLock;
use twofactor_adapters::{
    PostmarkEmailClient,
    config::{AppSettings, EmailClientSettings, PostgresSettings, RedisSettings},
};
use twofactor_application::{
    EnrollmentPolicy, LoginOrchestrator, SecondFactorAuthenticator, TokenDelivery,
};
use twofactor_core::{
    Email, EmailClient, LoginObserver, PrimaryAuthenticator, SystemClock, TokenStore,
    UserDirectory, UserError, UserSettings,
};

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Postgres error: {0}")]
    Postgres(#[from] sqlx::Error),
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("Invalid email sender: {0}")]
    Sender(#[from] UserError),
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// The flow every deployment of the service runs: one store answering the
/// three user questions, the system clock and the configured template.
pub type ServiceLoginFlow<U, T, E, O> = LoginOrchestrator<U, U, U, T, SystemClock, E, O>;

pub fn build_login_flow<U, T, E, O>(
    settings: &AppSettings,
    users: U,
    tokens: T,
    email_client: E,
    observer: O,
) -> ServiceLoginFlow<U, T, E, O>
where
    U: PrimaryAuthenticator + UserDirectory + UserSettings + Clone,
    T: TokenStore + Clone,
    E: EmailClient,
    O: LoginObserver,
{
    let second_factor = SecondFactorAuthenticator::new(
        users.clone(),
        users.clone(),
        EnrollmentPolicy::new(users, settings.twofactor.force_all),
        tokens,
        SystemClock,
        settings.expiration(),
    );
    let delivery = TokenDelivery::new(
        email_client,
        settings.twofactor.message.clone(),
        settings.site(),
    );

    LoginOrchestrator::new(second_factor, delivery, observer, settings.flow_config())
}

/// Connect to Postgres and run pending migrations.
pub async fn configure_postgresql(settings: &PostgresSettings) -> Result<PgPool, SetupError> {
    let pg_pool = get_postgres_pool(settings.url.expose_secret()).await?;

    sqlx::migrate!()
        .run(&pg_pool)
        .await
        .map_err(sqlx::Error::from)?;

    Ok(pg_pool)
}

pub async fn get_postgres_pool(url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new().max_connections(5).connect(url).await
}

pub fn configure_redis(
    settings: &RedisSettings,
) -> Result<Arc<RwLock<redis::Connection>>, SetupError> {
    let connection = get_redis_client(&settings.host_name)?.get_connection()?;
    Ok(Arc::new(RwLock::new(connection)))
}

pub fn get_redis_client(redis_hostname: &str) -> RedisResult<Client> {
    let redis_url = format!("redis://{}/", redis_hostname);
    redis::Client::open(redis_url)
}

pub fn configure_postmark_email_client(
    settings: &EmailClientSettings,
) -> Result<PostmarkEmailClient, SetupError> {
    let http_client = HttpClient::builder().timeout(settings.timeout()).build()?;
    let sender = Email::parse(Secret::new(settings.sender.clone()))?;

    Ok(PostmarkEmailClient::new(
        settings.base_url.clone(),
        sender,
        settings.auth_token.clone(),
        http_client,
    ))
}
