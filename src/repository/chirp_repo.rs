//! Chirp repository (PostgreSQL)

use super::ChirpRepository;
use crate::{
    error::AppError,
    models::chirp::{Chirp, SortOrder},
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgChirpRepository {
    db: PgPool,
}

impl PgChirpRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ChirpRepository for PgChirpRepository {
    async fn create(&self, body: &str, user_id: Uuid) -> Result<Chirp, AppError> {
        let now = Utc::now();
        let chirp = sqlx::query_as::<_, Chirp>(
            r#"
            INSERT INTO chirps (id, created_at, updated_at, body, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, created_at, updated_at, body, user_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(now)
        .bind(now)
        .bind(body)
        .bind(user_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_foreign_key_violation() => AppError::not_found("user"),
            _ => AppError::Database(e),
        })?;

        Ok(chirp)
    }

    async fn list(
        &self,
        author_id: Option<Uuid>,
        sort: SortOrder,
    ) -> Result<Vec<Chirp>, AppError> {
        let order = match sort {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        let sql = format!(
            r#"
            SELECT id, created_at, updated_at, body, user_id
            FROM chirps
            WHERE ($1::uuid IS NULL OR user_id = $1)
            ORDER BY created_at {}
            "#,
            order
        );

        let chirps = sqlx::query_as::<_, Chirp>(&sql)
            .bind(author_id)
            .fetch_all(&self.db)
            .await?;

        Ok(chirps)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Chirp>, AppError> {
        let chirp = sqlx::query_as::<_, Chirp>(
            "SELECT id, created_at, updated_at, body, user_id FROM chirps WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(chirp)
    }

    async fn find_owner(&self, id: Uuid) -> Result<Option<Uuid>, AppError> {
        let owner = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM chirps WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(owner)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
