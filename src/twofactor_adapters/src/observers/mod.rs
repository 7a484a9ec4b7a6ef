pub mod broadcast_login_observer;
pub mod tracing_login_observer;

pub use broadcast_login_observer::BroadcastLoginObserver;
pub use tracing_login_observer::TracingLoginObserver;
