use axum::{
    Router,
    http::{HeaderValue, Method, request},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use twofactor_adapters::{SessionManager, config::AllowedOrigins};
use twofactor_axum::{LoginState, routes};
use twofactor_core::{LoginFlow, SessionStore};

use crate::tracing::{make_span_with_request_id, on_request, on_response};

/// Serves the two login steps and the resend action.
pub struct TwoFactorService {
    router: Router,
}

impl TwoFactorService {
    /// Routes:
    /// - `POST /login`: credentials, or credentials and code in one form
    /// - `POST /login/token`: the emailed code
    /// - `GET|POST /login/resend-token?resend_token=1`: send another code
    pub fn new<F, S>(flow: F, sessions: SessionManager<S>) -> Self
    where
        F: LoginFlow,
        S: SessionStore + Clone + 'static,
    {
        let router = Router::new()
            .route("/login", post(routes::login::<F, S>))
            .route("/login/token", post(routes::login_token::<F, S>))
            .route(
                "/login/resend-token",
                get(routes::resend_token::<F, S>).post(routes::resend_token::<F, S>),
            )
            .with_state(LoginState::new(flow, sessions));

        Self { router }
    }

    fn with_trace_layer(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(make_span_with_request_id)
                .on_request(on_request)
                .on_response(on_response),
        );
        self
    }

    /// Router to mount inside a host application. Cross-origin requests
    /// with credentials are accepted from `allowed_origins` only.
    pub fn as_nested_router(mut self, allowed_origins: Option<AllowedOrigins>) -> Router {
        if let Some(allowed_origins) = allowed_origins.filter(|origins| !origins.is_empty()) {
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_credentials(true)
                .allow_origin(AllowOrigin::predicate(
                    move |origin: &HeaderValue, _request_parts: &request::Parts| {
                        origin
                            .to_str()
                            .is_ok_and(|origin| allowed_origins.contains(origin))
                    },
                ));

            self.router = self.router.layer(cors);
        }
        self.with_trace_layer().router
    }

    pub async fn run_standalone(
        self,
        listener: TcpListener,
        allowed_origins: Option<AllowedOrigins>,
    ) -> Result<(), std::io::Error> {
        let router = self.as_nested_router(allowed_origins);

        tracing::info!("Two-factor login service listening on {}", listener.local_addr()?);

        axum_server::Server::<std::net::SocketAddr>::from_listener(listener)
            .serve(router.into_make_service())
            .await
    }
}
