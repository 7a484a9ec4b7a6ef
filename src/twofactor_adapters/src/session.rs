//! Loading and committing the session handle around a request.

use axum_extra::extract::cookie::{Cookie, SameSite};
use twofactor_core::{AuthRequest, Session, SessionId, SessionStore, SessionStoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookieConfig {
    pub cookie_name: String,
    pub secure: bool,
}

impl Default for SessionCookieConfig {
    fn default() -> Self {
        Self {
            cookie_name: "twofactor_session".to_string(),
            secure: true,
        }
    }
}

/// Binds a `SessionStore` to the session cookie.
#[derive(Debug, Clone)]
pub struct SessionManager<S> {
    store: S,
    config: SessionCookieConfig,
}

impl<S> SessionManager<S>
where
    S: SessionStore,
{
    pub fn new(store: S, config: SessionCookieConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// The session named by the request cookie, or a fresh one when the cookie
    /// is missing, malformed, unknown or unreadable.
    #[tracing::instrument(name = "SessionManager::load", skip_all)]
    pub async fn load<R: AuthRequest>(&self, req: &R) -> Result<Session, SessionStoreError> {
        let Some(id) = req
            .cookie(&self.config.cookie_name)
            .and_then(SessionId::parse)
        else {
            return Ok(Session::new());
        };

        match self.store.load(&id).await {
            Ok(Some(data)) => Ok(Session::resume(id, data)),
            Ok(None) => Ok(Session::new()),
            Err(SessionStoreError::Corrupted(reason)) => {
                tracing::warn!(%reason, "Discarding unreadable session");
                self.store.delete(&id).await?;
                Ok(Session::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Write the session back. Returns the `Set-Cookie` value when the client
    /// has to learn a new session id.
    #[tracing::instrument(name = "SessionManager::commit", skip_all)]
    pub async fn commit(&self, session: &mut Session) -> Result<Option<String>, SessionStoreError> {
        if let Some(previous) = session.take_rotated_from() {
            self.store.delete(&previous).await?;
        }
        if !session.is_modified() {
            return Ok(None);
        }

        self.store.save(session.id(), session.data()).await?;

        if session.is_new() || session.was_rotated() {
            Ok(Some(self.cookie(session.id()).to_string()))
        } else {
            Ok(None)
        }
    }

    fn cookie(&self, id: &SessionId) -> Cookie<'static> {
        Cookie::build((self.config.cookie_name.clone(), id.as_str().to_owned()))
            .path("/")
            .http_only(true)
            .secure(self.config.secure)
            .same_site(SameSite::Lax)
            .build()
    }
}
