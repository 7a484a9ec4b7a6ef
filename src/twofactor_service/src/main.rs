use color_eyre::eyre::Result;
use tokio::net::TcpListener;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use twofactor_adapters::{
    DashMapSessionStore, HashMapTokenStore, HashMapUserStore, MockEmailClient, PostgresTokenStore,
    PostgresUserStore, RedisSessionStore, SessionManager, TracingLoginObserver,
    config::AppSettings,
};
use twofactor_core::{
    EmailClient, PrimaryAuthenticator, TokenStore, UserDirectory, UserSettings,
};
use twofactor_service::{
    TwoFactorService, build_login_flow, configure_postgresql, configure_postmark_email_client,
    configure_redis,
};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing()?;

    let settings = AppSettings::load()?;

    match settings.postgres.clone() {
        Some(postgres) => {
            let pg_pool = configure_postgresql(&postgres).await?;
            let users = PostgresUserStore::new(pg_pool.clone());
            seed_postgres(&settings, &users).await?;
            with_email_client(settings, users, PostgresTokenStore::new(pg_pool)).await
        }
        None => {
            tracing::warn!("No Postgres configured, users and codes are kept in memory");
            let users = HashMapUserStore::new();
            if let Some(seed) = &settings.seed_user {
                users
                    .add_user(seed.user()?, seed.password.clone(), seed.second_factor)
                    .await;
            }
            with_email_client(settings, users, HashMapTokenStore::new()).await
        }
    }
}

/// Create the configured seed user, or only update its enrollment when it
/// already exists from an earlier start.
async fn seed_postgres(settings: &AppSettings, users: &PostgresUserStore) -> Result<()> {
    let Some(seed) = &settings.seed_user else {
        return Ok(());
    };
    let user = seed.user()?;

    match users.find_by_identity(user.identity()).await? {
        Some(existing) => {
            users
                .set_second_factor_enabled(existing.id(), seed.second_factor)
                .await?;
        }
        None => {
            users
                .add_user(&user, seed.password.clone(), seed.second_factor)
                .await?;
        }
    }

    tracing::info!(user_id = %user.id(), "Seed user ready");
    Ok(())
}

async fn with_email_client<U, T>(settings: AppSettings, users: U, tokens: T) -> Result<()>
where
    U: PrimaryAuthenticator + UserDirectory + UserSettings + Clone + 'static,
    T: TokenStore + Clone + 'static,
{
    match &settings.email_client {
        Some(email_client) => {
            let email_client = configure_postmark_email_client(email_client)?;
            serve(settings, users, tokens, email_client).await
        }
        None => {
            tracing::warn!("No email client configured, mail stays in an in-memory outbox");
            serve(settings, users, tokens, MockEmailClient::new()).await
        }
    }
}

async fn serve<U, T, E>(settings: AppSettings, users: U, tokens: T, email_client: E) -> Result<()>
where
    U: PrimaryAuthenticator + UserDirectory + UserSettings + Clone + 'static,
    T: TokenStore + Clone + 'static,
    E: EmailClient + 'static,
{
    let flow = build_login_flow(&settings, users, tokens, email_client, TracingLoginObserver);

    let service = match &settings.redis {
        Some(redis) => {
            let store = RedisSessionStore::new(configure_redis(redis)?, settings.session.ttl_seconds);
            TwoFactorService::new(flow, SessionManager::new(store, settings.cookie_config()))
        }
        None => {
            let store = DashMapSessionStore::new(settings.session_ttl());
            TwoFactorService::new(flow, SessionManager::new(store, settings.cookie_config()))
        }
    };

    let listener = TcpListener::bind(&settings.application.address).await?;
    service
        .run_standalone(listener, Some(settings.allowed_origins.clone()))
        .await?;

    Ok(())
}

fn init_tracing() -> Result<()> {
    let fmt_layer = fmt::layer().compact();
    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .init();

    Ok(())
}

