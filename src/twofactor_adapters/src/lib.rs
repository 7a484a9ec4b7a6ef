pub mod config;
pub mod email;
pub mod handlers;
pub mod observers;
pub mod persistence;
pub mod session;

pub use email::{MockEmailClient, PostmarkEmailClient};
pub use handlers::{handle_login, handle_login_token, handle_resend_token};
pub use observers::{BroadcastLoginObserver, TracingLoginObserver};
pub use persistence::{
    DashMapSessionStore, HashMapTokenStore, HashMapUserStore, PostgresTokenStore,
    PostgresUserStore, RedisSessionStore,
};
pub use session::{SessionCookieConfig, SessionManager};
