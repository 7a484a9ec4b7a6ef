use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version,
    password_hash::{PasswordHasher, SaltString, rand_core},
};
use secrecy::{ExposeSecret, Secret};
use sqlx::{Pool, Postgres};
use twofactor_core::{
    AuthVerdict, AuthenticatorError, Credential, Email, Identity, PrimaryAuthenticator, User,
    UserDirectory, UserDirectoryError, UserId, UserSettings, UserSettingsError,
};
use uuid::Uuid;

/// Users table of the host application. Passwords are stored as Argon2id
/// hashes and checked off the async executor.
#[derive(Clone)]
pub struct PostgresUserStore {
    pool: sqlx::PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        PostgresUserStore { pool }
    }

    #[tracing::instrument(name = "Adding user to PostgreSQL", skip_all)]
    pub async fn add_user(
        &self,
        user: &User,
        password: Secret<String>,
        second_factor: bool,
    ) -> Result<(), UserDirectoryError> {
        let password_hash = compute_password_hash(password)
            .await
            .map_err(UserDirectoryError::UnexpectedError)?;

        sqlx::query(
            r#"
                INSERT INTO users (id, identity, email, name, active, password_hash, second_factor)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.identity().as_str())
        .bind(user.email().as_ref().expose_secret())
        .bind(user.name())
        .bind(user.is_active())
        .bind(password_hash.expose_secret())
        .bind(second_factor)
        .execute(&self.pool)
        .await
        .map_err(|e| UserDirectoryError::UnexpectedError(e.to_string()))?;

        Ok(())
    }

    async fn fetch(&self, identity: &Identity) -> Result<Option<UserRow>, sqlx::Error> {
        sqlx::query_as::<_, UserRow>(
            r#"
                SELECT id, identity, email, name, active, password_hash
                FROM users
                WHERE identity = $1
            "#,
        )
        .bind(identity.as_str())
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    identity: String,
    email: String,
    name: String,
    active: bool,
    password_hash: String,
}

impl UserRow {
    fn into_user(self) -> Result<(User, Secret<String>), String> {
        let identity = Identity::parse(&self.identity).map_err(|e| e.to_string())?;
        let email = Email::parse(Secret::new(self.email)).map_err(|e| e.to_string())?;
        let user = User::new(
            UserId::from(self.id),
            identity,
            email,
            self.name,
            self.active,
        );
        Ok((user, Secret::new(self.password_hash)))
    }
}

#[async_trait::async_trait]
impl UserDirectory for PostgresUserStore {
    #[tracing::instrument(name = "Retrieving user from PostgreSQL", skip_all)]
    async fn find_by_identity(
        &self,
        identity: &Identity,
    ) -> Result<Option<User>, UserDirectoryError> {
        let row = self
            .fetch(identity)
            .await
            .map_err(|e| UserDirectoryError::UnexpectedError(e.to_string()))?;

        row.map(|row| row.into_user().map(|(user, _)| user))
            .transpose()
            .map_err(UserDirectoryError::UnexpectedError)
    }
}

#[async_trait::async_trait]
impl UserSettings for PostgresUserStore {
    #[tracing::instrument(name = "Reading second factor setting", skip_all)]
    async fn second_factor_enabled(&self, user_id: &UserId) -> Result<bool, UserSettingsError> {
        let enabled: Option<bool> =
            sqlx::query_scalar("SELECT second_factor FROM users WHERE id = $1")
                .bind(user_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| UserSettingsError::UnexpectedError(e.to_string()))?;

        enabled.ok_or(UserSettingsError::UserNotFound)
    }

    #[tracing::instrument(name = "Updating second factor setting", skip_all)]
    async fn set_second_factor_enabled(
        &self,
        user_id: &UserId,
        enabled: bool,
    ) -> Result<(), UserSettingsError> {
        let result = sqlx::query("UPDATE users SET second_factor = $1 WHERE id = $2")
            .bind(enabled)
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| UserSettingsError::UnexpectedError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserSettingsError::UserNotFound);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl PrimaryAuthenticator for PostgresUserStore {
    #[tracing::instrument(name = "Validating user credentials in PostgreSQL", skip_all)]
    async fn authenticate(
        &self,
        identity: &Identity,
        credential: &Credential,
    ) -> Result<AuthVerdict, AuthenticatorError> {
        let row = self
            .fetch(identity)
            .await
            .map_err(|e| AuthenticatorError::UnexpectedError(e.to_string()))?;

        let Some(row) = row else {
            return Ok(AuthVerdict::IdentityNotFound);
        };
        let (user, password_hash) = row
            .into_user()
            .map_err(AuthenticatorError::UnexpectedError)?;
        if !user.is_active() {
            return Ok(AuthVerdict::IdentityNotFound);
        }

        match verify_password_hash(password_hash, credential.as_ref().clone()).await {
            Ok(()) => Ok(AuthVerdict::Success(user)),
            Err(reason) => Ok(AuthVerdict::CredentialInvalid(reason)),
        }
    }
}

fn hasher() -> Result<Argon2<'static>, String> {
    Ok(Argon2::new(
        Algorithm::Argon2id,
        Version::V0x13,
        Params::new(15000, 2, 1, None).map_err(|e| e.to_string())?,
    ))
}

#[tracing::instrument(name = "Verify password hash", skip_all)]
async fn verify_password_hash(
    expected_password_hash: Secret<String>,
    password_candidate: Secret<String>,
) -> Result<(), String> {
    let current_span: tracing::Span = tracing::Span::current();
    tokio::task::spawn_blocking(move || {
        current_span.in_scope(|| {
            let expected_password_hash: PasswordHash<'_> =
                PasswordHash::new(expected_password_hash.expose_secret())
                    .map_err(|e| e.to_string())?;

            hasher()?
                .verify_password(
                    password_candidate.expose_secret().as_bytes(),
                    &expected_password_hash,
                )
                .map_err(|e| e.to_string())
        })
    })
    .await
    .map_err(|e| e.to_string())?
}

#[tracing::instrument(name = "Computing password hash", skip_all)]
async fn compute_password_hash(password: Secret<String>) -> Result<Secret<String>, String> {
    let current_span: tracing::Span = tracing::Span::current();
    tokio::task::spawn_blocking(move || {
        current_span.in_scope(move || {
            let salt: SaltString = SaltString::generate(rand_core::OsRng);
            hasher()?
                .hash_password(password.expose_secret().as_bytes(), &salt)
                .map(|h| Secret::from(h.to_string()))
                .map_err(|e| e.to_string())
        })
    })
    .await
    .map_err(|e| e.to_string())?
}
