pub mod env {
    pub const APP_ENVIRONMENT_ENV_VAR: &str = "APP_ENVIRONMENT";
    pub const SETTINGS_ENV_PREFIX: &str = "TWOFACTOR";
    pub const SETTINGS_ENV_SEPARATOR: &str = "__";
}

pub const CONFIG_DIR: &str = "config";
pub const DEFAULT_ENVIRONMENT: &str = "local";

pub const DEFAULT_EXPIRATION_SECONDS: u32 = 1200;
pub const MAX_EXPIRATION_SECONDS: u32 = 86_400;
pub const DEFAULT_SESSION_COOKIE_NAME: &str = "twofactor_session";
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 3600;

pub mod prod {
    pub const APP_ADDRESS: &str = "0.0.0.0:3000";
}

pub mod test {
    pub const APP_ADDRESS: &str = "127.0.0.1:0";
}
