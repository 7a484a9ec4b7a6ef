use tokio::sync::broadcast;
use twofactor_core::{LoginEvent, LoginObserver};

/// Publishes login events on a broadcast channel for any number of listeners.
/// Events sent while nobody listens are dropped.
#[derive(Debug, Clone)]
pub struct BroadcastLoginObserver {
    sender: broadcast::Sender<LoginEvent>,
}

impl BroadcastLoginObserver {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LoginEvent> {
        self.sender.subscribe()
    }
}

#[async_trait::async_trait]
impl LoginObserver for BroadcastLoginObserver {
    async fn user_logged_in(&self, event: LoginEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("No listener for login events");
        }
    }
}
