//! User repository (PostgreSQL)

use super::{map_unique_violation, UserRepository};
use crate::{
    error::AppError,
    models::user::{User, UserCredential},
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, email: &str, hashed_password: &str) -> Result<User, AppError> {
        let now = Utc::now();
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, created_at, updated_at, email, hashed_password)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, created_at, updated_at, email, is_chirpy_red
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(now)
        .bind(now)
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "email"))
    }

    async fn find_credential_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredential>, AppError> {
        let credential = sqlx::query_as::<_, UserCredential>(
            "SELECT id, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(credential)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, created_at, updated_at, email, is_chirpy_red FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = $2, hashed_password = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, created_at, updated_at, email, is_chirpy_red
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(hashed_password)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "email"))
    }

    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE users SET is_chirpy_red = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM users").execute(&self.db).await?;

        Ok(result.rows_affected())
    }
}
