//! Axum integration for the two-factor login flow.
//!
//! The request and response wrappers implement the `twofactor_core` HTTP
//! traits; the routes extract the form or query input and call the
//! framework-agnostic handlers from `twofactor_adapters`.
//!
//! ```ignore
//! use twofactor_axum::{LoginState, routes};
//!
//! let app = Router::new()
//!     .route("/login", post(routes::login::<Flow, Store>))
//!     .route("/login/token", post(routes::login_token::<Flow, Store>))
//!     .with_state(LoginState::new(flow, sessions));
//! ```

pub mod adapters;
pub mod routes;
pub mod state;

pub use adapters::{AxumRequest, AxumResponseBuilder, response_builder};
pub use state::LoginState;
