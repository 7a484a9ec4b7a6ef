use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres};
use twofactor_core::{
    SecondFactorToken, TokenId, TokenStore, TokenStoreError, TwoFaCode, UserId,
};
use uuid::Uuid;

/// Token store backed by the `second_factor_tokens` table.
#[derive(Clone)]
pub struct PostgresTokenStore {
    pool: PgPool,
}

impl PostgresTokenStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        PostgresTokenStore { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TokenRow {
    id: Uuid,
    user_id: Uuid,
    code: i16,
    created_at: DateTime<Utc>,
}

impl TryFrom<TokenRow> for SecondFactorToken {
    type Error = TokenStoreError;

    fn try_from(row: TokenRow) -> Result<Self, Self::Error> {
        let code = u16::try_from(row.code)
            .ok()
            .and_then(|value| TwoFaCode::from_value(value).ok())
            .ok_or_else(|| {
                TokenStoreError::UnexpectedError(format!("stored code {} is out of range", row.code))
            })?;
        Ok(SecondFactorToken::restore(
            TokenId::from(row.id),
            UserId::from(row.user_id),
            code,
            row.created_at,
        ))
    }
}

fn code_column(code: TwoFaCode) -> i16 {
    // Codes never exceed 9999.
    code.value() as i16
}

fn unexpected(e: sqlx::Error) -> TokenStoreError {
    TokenStoreError::UnexpectedError(e.to_string())
}

#[async_trait::async_trait]
impl TokenStore for PostgresTokenStore {
    #[tracing::instrument(name = "Storing second factor token in PostgreSQL", skip_all)]
    async fn insert(&self, token: SecondFactorToken) -> Result<(), TokenStoreError> {
        sqlx::query(
            r#"
                INSERT INTO second_factor_tokens (id, user_id, code, created_at)
                VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(token.id().as_uuid())
        .bind(token.user_id().as_uuid())
        .bind(code_column(token.code()))
        .bind(token.created_at())
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(())
    }

    #[tracing::instrument(name = "Looking up second factor token in PostgreSQL", skip_all)]
    async fn find_match(
        &self,
        user_id: &UserId,
        code: TwoFaCode,
        issued_after: DateTime<Utc>,
    ) -> Result<Option<SecondFactorToken>, TokenStoreError> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
                SELECT id, user_id, code, created_at
                FROM second_factor_tokens
                WHERE user_id = $1 AND code = $2 AND created_at > $3
                LIMIT 1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(code_column(code))
        .bind(issued_after)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        row.map(SecondFactorToken::try_from).transpose()
    }

    #[tracing::instrument(name = "Consuming second factor token in PostgreSQL", skip_all)]
    async fn consume_match(
        &self,
        user_id: &UserId,
        code: TwoFaCode,
        issued_after: DateTime<Utc>,
    ) -> Result<Option<SecondFactorToken>, TokenStoreError> {
        // One statement: a concurrent consumer blocks on the row locks and then
        // finds the rows gone.
        let rows = sqlx::query_as::<_, TokenRow>(
            r#"
                DELETE FROM second_factor_tokens
                WHERE user_id = $1
                  AND EXISTS (
                      SELECT 1 FROM second_factor_tokens
                      WHERE user_id = $1 AND code = $2 AND created_at > $3
                  )
                RETURNING id, user_id, code, created_at
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(code_column(code))
        .bind(issued_after)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let mut matched = None;
        for row in rows {
            let token = SecondFactorToken::try_from(row)?;
            if token.code() == code && token.created_at() > issued_after {
                matched = Some(token);
            }
        }
        Ok(matched)
    }

    #[tracing::instrument(name = "Sweeping expired second factor tokens", skip_all)]
    async fn sweep_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, TokenStoreError> {
        let result = sqlx::query("DELETE FROM second_factor_tokens WHERE created_at <= $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(name = "Invalidating second factor tokens", skip_all)]
    async fn invalidate_all(&self, user_id: &UserId) -> Result<u64, TokenStoreError> {
        let result = sqlx::query("DELETE FROM second_factor_tokens WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(result.rows_affected())
    }
}
