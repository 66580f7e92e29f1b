//! Refresh token repository (PostgreSQL)

use super::RefreshTokenRepository;
use crate::{auth::RefreshRecord, error::AppError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PgRefreshTokenRepository {
    db: PgPool,
}

impl PgRefreshTokenRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    async fn store(&self, record: &RefreshRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (
                token_hash, user_id, created_at, updated_at, expires_at, revoked_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&record.token_hash)
        .bind(record.user_id)
        .bind(record.created_at)
        .bind(record.updated_at)
        .bind(record.expires_at)
        .bind(record.revoked_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn find(&self, token_hash: &str) -> Result<Option<RefreshRecord>, AppError> {
        let record = sqlx::query_as::<_, RefreshRecord>(
            r#"
            SELECT token_hash, user_id, created_at, updated_at, expires_at, revoked_at
            FROM refresh_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.db)
        .await?;

        Ok(record)
    }

    async fn mark_revoked(&self, token_hash: &str, at: DateTime<Utc>) -> Result<bool, AppError> {
        // COALESCE keeps the first revocation time on repeated calls
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = COALESCE(revoked_at, $2), updated_at = $2
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .bind(at)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
