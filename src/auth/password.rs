//! Password hashing and verification using Argon2id

use super::AuthError;
use crate::{config::SecurityConfig, error::AppError};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

/// Password hasher with configurable work factor
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create a hasher with explicit Argon2id parameters
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AuthError::Hashing(format!("invalid Argon2 params: {}", e)))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        Ok(Self { argon2 })
    }

    /// Create hasher from security config
    pub fn from_config(config: &SecurityConfig) -> Result<Self, AuthError> {
        Self::new(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
        )
    }

    /// Hash a password into a PHC string with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AuthError::Hashing(e.to_string())
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a stored hash.
    ///
    /// Fails closed: an unparsable hash is reported as a mismatch.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!("Failed to parse password hash: {:?}", e);
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Hash on the blocking pool so the runtime is not stalled.
    pub async fn hash_blocking(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Hashing(format!("hashing task failed: {}", e)))?
    }

    /// Verify on the blocking pool. A panicked or cancelled task counts as a mismatch.
    pub async fn verify_blocking(&self, password: String, hash: String) -> bool {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .unwrap_or(false)
    }

    /// Validate password against the configured policy
    pub fn validate_password_policy(
        password: &str,
        policy: &SecurityConfig,
    ) -> Result<(), AppError> {
        if password.chars().count() < policy.password_min_length {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                policy.password_min_length
            )));
        }

        Ok(())
    }
}
