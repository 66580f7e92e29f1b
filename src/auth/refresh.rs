//! Opaque refresh tokens with server-side expiry and revocation
//!
//! Tokens are 32 random bytes, hex encoded. Only their SHA-256 digest is
//! persisted. Using a token does not rotate it: it keeps minting access
//! tokens until it expires or is revoked.

use super::AuthError;
use crate::repository::RefreshTokenRepository;
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

const TOKEN_BYTES: usize = 32;

/// Persisted refresh token state
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshRecord {
    pub token_hash: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshRecord {
    /// Not revoked and not yet expired at `now`
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && now < self.expires_at
    }
}

/// Refresh token store
pub struct RefreshTokenService {
    repo: Arc<dyn RefreshTokenRepository>,
    horizon: Duration,
}

impl RefreshTokenService {
    pub fn new(repo: Arc<dyn RefreshTokenRepository>, horizon: Duration) -> Self {
        Self { repo, horizon }
    }

    /// Mint and persist a new token for `user_id`, returning the cleartext
    pub async fn issue(&self, user_id: Uuid) -> Result<String, AuthError> {
        let token = generate_token();
        let now = Utc::now();

        let record = RefreshRecord {
            token_hash: hash_token(&token),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at: now + self.horizon,
            revoked_at: None,
        };
        self.repo.store(&record).await?;

        tracing::debug!(user_id = %user_id, expires_at = %record.expires_at, "Refresh token issued");
        Ok(token)
    }

    /// Look a token up without applying any validity rule
    pub async fn resolve(&self, token: &str) -> Result<RefreshRecord, AuthError> {
        self.repo
            .find(&hash_token(token))
            .await?
            .ok_or(AuthError::RefreshTokenNotFound)
    }

    /// Resolve and require the record to be usable at `now`
    pub async fn resolve_usable(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<RefreshRecord, AuthError> {
        let record = self.resolve(token).await?;
        if !record.is_usable(now) {
            return Err(AuthError::RefreshTokenExpiredOrRevoked);
        }
        Ok(record)
    }

    /// Revoke a token. Revoking an already revoked token is not an error.
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let found = self.repo.mark_revoked(&hash_token(token), Utc::now()).await?;
        if !found {
            return Err(AuthError::RefreshTokenNotFound);
        }
        Ok(())
    }
}

/// 256 bits from the OS CSPRNG, hex encoded
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 digest used as the storage key
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
