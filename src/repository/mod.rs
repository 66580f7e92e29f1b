//! Persistence layer
//!
//! The auth core and the handlers only see these narrow traits. PostgreSQL
//! backs them in production; [`MemoryStore`] backs tests and `--in-memory` runs.

pub mod auth_repo;
pub mod chirp_repo;
pub mod memory;
pub mod user_repo;

pub use auth_repo::PgRefreshTokenRepository;
pub use chirp_repo::PgChirpRepository;
pub use memory::MemoryStore;
pub use user_repo::PgUserRepository;

use crate::{
    auth::RefreshRecord,
    error::AppError,
    models::{
        chirp::{Chirp, SortOrder},
        user::{User, UserCredential},
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user; a taken email is reported as [`AppError::Conflict`]
    async fn create(&self, email: &str, hashed_password: &str) -> Result<User, AppError>;

    async fn find_credential_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredential>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<User>, AppError>;

    /// Returns `false` if no such user exists
    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<bool, AppError>;

    /// Bulk reset; cascades to chirps and refresh tokens
    async fn delete_all(&self) -> Result<u64, AppError>;
}

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn store(&self, record: &RefreshRecord) -> Result<(), AppError>;

    async fn find(&self, token_hash: &str) -> Result<Option<RefreshRecord>, AppError>;

    /// Set `revoked_at` unless already set. Returns whether the token exists.
    async fn mark_revoked(&self, token_hash: &str, at: DateTime<Utc>) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ChirpRepository: Send + Sync {
    async fn create(&self, body: &str, user_id: Uuid) -> Result<Chirp, AppError>;

    async fn list(&self, author_id: Option<Uuid>, sort: SortOrder)
        -> Result<Vec<Chirp>, AppError>;

    async fn find(&self, id: Uuid) -> Result<Option<Chirp>, AppError>;

    /// Creator of a chirp, the only input to the ownership check
    async fn find_owner(&self, id: Uuid) -> Result<Option<Uuid>, AppError>;

    /// Returns `false` if no such chirp exists
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Map a unique-constraint violation to a conflict, anything else to a database error
pub(crate) fn map_unique_violation(e: sqlx::Error, what: &str) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(format!("{} already exists", what))
        }
        _ => AppError::Database(e),
    }
}
