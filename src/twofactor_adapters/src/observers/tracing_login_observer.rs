use twofactor_core::{LoginEvent, LoginObserver};

/// Writes every completed login to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLoginObserver;

#[async_trait::async_trait]
impl LoginObserver for TracingLoginObserver {
    async fn user_logged_in(&self, event: LoginEvent) {
        tracing::info!(
            user_id = %event.user_id,
            second_factor = event.second_factor,
            at = %event.at,
            "Login completed"
        );
    }
}
