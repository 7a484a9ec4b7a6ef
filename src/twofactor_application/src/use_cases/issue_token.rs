use secrecy::ExposeSecret;
use thiserror::Error;
use twofactor_core::{
    Clock, EmailClient, MessageContext, MessageTemplate, SecondFactorToken, TokenStore,
    TokenStoreError, TwoFaCode, User,
};

/// Creates and stores a fresh code for a user.
#[derive(Debug, Clone)]
pub struct TokenIssuer<T, C>
where
    T: TokenStore,
    C: Clock,
{
    token_store: T,
    clock: C,
}

impl<T, C> TokenIssuer<T, C>
where
    T: TokenStore,
    C: Clock,
{
    pub fn new(token_store: T, clock: C) -> Self {
        Self { token_store, clock }
    }

    /// Store a new token for `user`. Tokens issued earlier stay valid until
    /// they expire or one of them is used.
    #[tracing::instrument(name = "TokenIssuer::create_token", skip_all, fields(user_id = %user.id()))]
    pub async fn create_token(&self, user: &User) -> Result<SecondFactorToken, TokenStoreError> {
        let token = SecondFactorToken::new(*user.id(), TwoFaCode::new(), self.clock.now());
        self.token_store.insert(token.clone()).await?;
        tracing::debug!(token_id = %token.id(), "Second factor token stored");
        Ok(token)
    }
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Failed to send email: {0}")]
    EmailError(String),
}

/// Title and URL of the host site, shown in the message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteInfo {
    pub title: String,
    pub url: String,
}

/// Sends a token to the user's mailbox.
#[derive(Debug, Clone)]
pub struct TokenDelivery<E>
where
    E: EmailClient,
{
    email_client: E,
    template: MessageTemplate,
    site: SiteInfo,
}

impl<E> TokenDelivery<E>
where
    E: EmailClient,
{
    pub fn new(email_client: E, template: MessageTemplate, site: SiteInfo) -> Self {
        Self {
            email_client,
            template,
            site,
        }
    }

    pub fn email_client(&self) -> &E {
        &self.email_client
    }

    #[tracing::instrument(name = "TokenDelivery::deliver", skip_all, fields(user_id = %user.id()))]
    pub async fn deliver(&self, user: &User, token: &SecondFactorToken) -> Result<(), DeliveryError> {
        let code = token.code().to_string();
        let message = self.template.render(&MessageContext {
            main_title: &self.site.title,
            main_url: &self.site.url,
            user_email: user.email().as_ref().expose_secret(),
            user_name: user.name(),
            token: &code,
        });

        self.email_client
            .send_email(user.email(), &message.subject, &message.body)
            .await
            .map_err(DeliveryError::EmailError)
    }
}
