use std::sync::Arc;

use twofactor_adapters::SessionManager;

/// Router state shared by the login routes.
pub struct LoginState<F, S> {
    pub flow: Arc<F>,
    pub sessions: SessionManager<S>,
}

impl<F, S> LoginState<F, S> {
    pub fn new(flow: F, sessions: SessionManager<S>) -> Self {
        Self {
            flow: Arc::new(flow),
            sessions,
        }
    }
}

impl<F, S: Clone> Clone for LoginState<F, S> {
    fn clone(&self) -> Self {
        Self {
            flow: Arc::clone(&self.flow),
            sessions: self.sessions.clone(),
        }
    }
}
