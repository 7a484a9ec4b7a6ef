pub mod constants;
pub mod settings;

pub use constants::*;
pub use settings::{
    AllowedOrigins, AppSettings, ApplicationSettings, EmailClientSettings, PostgresSettings,
    RedisSettings, SeedUserSettings, SessionSettings, SettingsError, TwoFactorSettings,
};
