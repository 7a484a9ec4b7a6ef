use std::time::Duration;

use chrono::TimeDelta;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use secrecy::Secret;
use serde::Deserialize;
use twofactor_application::{LoginFlowConfig, SiteInfo};
use twofactor_core::{Email, Identity, MessageTemplate, User, UserError, UserId};

use super::constants::{
    CONFIG_DIR, DEFAULT_ENVIRONMENT, DEFAULT_EXPIRATION_SECONDS, DEFAULT_SESSION_COOKIE_NAME,
    DEFAULT_SESSION_TTL_SECONDS, MAX_EXPIRATION_SECONDS, env, prod,
};
use crate::session::SessionCookieConfig;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Token expiration must be between 0 and {MAX_EXPIRATION_SECONDS} seconds, got {0}")]
    InvalidExpiration(u32),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    pub application: ApplicationSettings,
    pub twofactor: TwoFactorSettings,
    pub session: SessionSettings,
    /// In-memory stores are used when absent.
    pub postgres: Option<PostgresSettings>,
    /// Sessions stay in process memory when absent.
    pub redis: Option<RedisSettings>,
    /// Mail stays in an in-memory outbox when absent.
    pub email_client: Option<EmailClientSettings>,
    #[serde(default)]
    pub allowed_origins: AllowedOrigins,
    /// Account created at startup, for demos and local testing.
    pub seed_user: Option<SeedUserSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwoFactorSettings {
    pub expiration_seconds: u32,
    pub force_all: bool,
    pub landing_path: String,
    pub site_title: String,
    pub site_url: String,
    pub message: MessageTemplate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    pub cookie_name: String,
    pub ttl_seconds: u64,
    pub secure_cookie: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresSettings {
    pub url: Secret<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisSettings {
    pub host_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailClientSettings {
    pub base_url: String,
    pub sender: String,
    pub auth_token: Secret<String>,
    pub timeout_in_millis: u64,
}

impl EmailClientSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_in_millis)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedUserSettings {
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub password: Secret<String>,
    #[serde(default)]
    pub second_factor: bool,
}

impl SeedUserSettings {
    /// The seeded user logs in with its email address.
    pub fn user(&self) -> Result<User, UserError> {
        Ok(User::new(
            UserId::new(),
            Identity::parse(&self.email)?,
            Email::parse(Secret::new(self.email.clone()))?,
            self.name.clone(),
            true,
        ))
    }
}

/// Origins allowed to call the login endpoints with credentials.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct AllowedOrigins(Vec<String>);

impl AllowedOrigins {
    pub fn new(origins: Vec<String>) -> Self {
        Self(origins)
    }

    pub fn contains(&self, origin: &str) -> bool {
        self.0.iter().any(|allowed| allowed == origin)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AppSettings {
    /// Layers `config/base.json`, `config/{APP_ENVIRONMENT}.json` and
    /// `TWOFACTOR__`-prefixed environment variables over the defaults.
    pub fn load() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();

        let environment = std::env::var(env::APP_ENVIRONMENT_ENV_VAR)
            .unwrap_or_else(|_| DEFAULT_ENVIRONMENT.to_string());

        let builder = Self::defaults()?
            .add_source(File::with_name(&format!("{CONFIG_DIR}/base")).required(false))
            .add_source(File::with_name(&format!("{CONFIG_DIR}/{environment}")).required(false))
            .add_source(
                Environment::with_prefix(env::SETTINGS_ENV_PREFIX)
                    .prefix_separator(env::SETTINGS_ENV_SEPARATOR)
                    .separator(env::SETTINGS_ENV_SEPARATOR)
                    .list_separator(",")
                    .with_list_parse_key("allowed_origins")
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let message = MessageTemplate::default();

        Config::builder()
            .set_default("application.address", prod::APP_ADDRESS)?
            .set_default("twofactor.expiration_seconds", DEFAULT_EXPIRATION_SECONDS)?
            .set_default("twofactor.force_all", false)?
            .set_default("twofactor.landing_path", "/")?
            .set_default("twofactor.site_title", "")?
            .set_default("twofactor.site_url", "")?
            .set_default("twofactor.message.subject", message.subject)?
            .set_default("twofactor.message.body", message.body)?
            .set_default("session.cookie_name", DEFAULT_SESSION_COOKIE_NAME)?
            .set_default("session.ttl_seconds", DEFAULT_SESSION_TTL_SECONDS)?
            .set_default("session.secure_cookie", true)?
            .set_default("allowed_origins", Vec::<String>::new())
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, SettingsError> {
        let settings: Self = builder.build()?.try_deserialize()?;

        if settings.twofactor.expiration_seconds > MAX_EXPIRATION_SECONDS {
            return Err(SettingsError::InvalidExpiration(
                settings.twofactor.expiration_seconds,
            ));
        }

        Ok(settings)
    }

    pub fn expiration(&self) -> TimeDelta {
        TimeDelta::seconds(i64::from(self.twofactor.expiration_seconds))
    }

    pub fn session_ttl(&self) -> TimeDelta {
        TimeDelta::seconds(i64::try_from(self.session.ttl_seconds).unwrap_or(i64::MAX))
    }

    pub fn site(&self) -> SiteInfo {
        SiteInfo {
            title: self.twofactor.site_title.clone(),
            url: self.twofactor.site_url.clone(),
        }
    }

    pub fn flow_config(&self) -> LoginFlowConfig {
        LoginFlowConfig {
            landing_path: self.twofactor.landing_path.clone(),
        }
    }

    pub fn cookie_config(&self) -> SessionCookieConfig {
        SessionCookieConfig {
            cookie_name: self.session.cookie_name.clone(),
            secure: self.session.secure_cookie,
        }
    }
}
