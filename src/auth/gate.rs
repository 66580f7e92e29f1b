//! Request authentication and resource-level authorization
//!
//! `AuthGate` owns every credential primitive and is the only place the
//! handlers go to answer "who is calling" and "may they do this".

use super::{extract_api_key, extract_bearer, AuthError, JwtService, PasswordHasher, RefreshTokenService};
use crate::{
    config::{AppConfig, Platform},
    error::AppError,
    repository::{RefreshTokenRepository, UserRepository},
};
use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use secrecy::{ExposeSecret, Secret};
use std::sync::Arc;
use uuid::Uuid;

/// Tokens handed out by a successful login
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
}

pub struct AuthGate {
    jwt: JwtService,
    hasher: PasswordHasher,
    refresh: RefreshTokenService,
    polka_key: Secret<String>,
    platform: Platform,
}

impl AuthGate {
    pub fn new(
        jwt: JwtService,
        hasher: PasswordHasher,
        refresh: RefreshTokenService,
        polka_key: Secret<String>,
        platform: Platform,
    ) -> Self {
        Self {
            jwt,
            hasher,
            refresh,
            polka_key,
            platform,
        }
    }

    /// Wire the gate from configuration and a refresh token backend
    pub fn from_config(
        config: &AppConfig,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
    ) -> Result<Self, AuthError> {
        let security = &config.security;
        let horizon = Duration::days(security.refresh_token_exp_days as i64);

        Ok(Self::new(
            JwtService::from_config(security),
            PasswordHasher::from_config(security)?,
            RefreshTokenService::new(refresh_tokens, horizon),
            security.polka_key.clone(),
            config.platform,
        ))
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Resolve the principal behind an access token.
    ///
    /// Every failure collapses to `Unauthorized`; the precise reason only
    /// reaches the debug log.
    pub fn authenticate_session(&self, headers: &HeaderMap) -> Result<Uuid, AppError> {
        extract_bearer(headers)
            .and_then(|token| self.jwt.validate(&token))
            .map_err(|e| {
                tracing::debug!(reason = %e, "Session authentication failed");
                AppError::Unauthorized
            })
    }

    /// Check a password and open a session
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        users: &dyn UserRepository,
    ) -> Result<Session, AuthError> {
        let credential = users
            .find_credential_by_email(email)
            .await?
            .ok_or(AuthError::UnknownAccount)?;

        let matches = self
            .hasher
            .verify_blocking(password.to_string(), credential.hashed_password)
            .await;
        if !matches {
            tracing::info!(user_id = %credential.id, "Login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.jwt.issue_access_token(credential.id)?;
        let refresh_token = self.refresh.issue(credential.id).await?;

        tracing::info!(user_id = %credential.id, "User logged in");

        Ok(Session {
            user_id: credential.id,
            access_token,
            refresh_token,
        })
    }

    /// Mint a new access token from the bearer refresh token.
    /// The refresh token itself stays as it is.
    pub async fn refresh_session(&self, headers: &HeaderMap) -> Result<String, AuthError> {
        let token = extract_bearer(headers)?;
        let record = self.refresh.resolve_usable(&token, Utc::now()).await?;

        self.jwt.issue_access_token(record.user_id)
    }

    pub async fn revoke_session(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let token = extract_bearer(headers)?;
        self.refresh.revoke(&token).await
    }

    /// Only the creator may mutate a resource
    pub fn authorize_ownership(&self, principal: Uuid, owner: Uuid) -> bool {
        principal == owner
    }

    pub fn authorize_webhook(&self, headers: &HeaderMap) -> bool {
        match extract_api_key(headers) {
            Ok(key) => key == *self.polka_key.expose_secret(),
            Err(e) => {
                tracing::debug!(reason = %e, "Webhook key missing");
                false
            }
        }
    }

    pub fn authorize_admin_action(&self) -> bool {
        self.platform == Platform::Dev
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryStore;
    use axum::http::header::AUTHORIZATION;

    const SECRET: &[u8] = b"test_secret_key_32_characters_long!";
    const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

    fn gate_with(store: Arc<MemoryStore>, platform: Platform) -> AuthGate {
        AuthGate::new(
            JwtService::new(SECRET, Duration::hours(1)),
            PasswordHasher::new(1024, 1, 1).unwrap(),
            RefreshTokenService::new(store, Duration::days(60)),
            Secret::new(POLKA_KEY.to_string()),
            platform,
        )
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value.parse().unwrap());
        headers
    }

    fn bearer(token: &str) -> HeaderMap {
        headers(&format!("Bearer {}", token))
    }

    async fn register(gate: &AuthGate, store: &MemoryStore, email: &str, password: &str) -> Uuid {
        let hash = gate.hasher().hash(password).unwrap();
        UserRepository::create(store, email, &hash).await.unwrap().id
    }

    #[tokio::test]
    async fn test_swordfish_session_lifecycle() {
        let store = Arc::new(MemoryStore::new());
        let gate = gate_with(store.clone(), Platform::Production);
        let user_id = register(&gate, &store, "walt@breakingbad.com", "swordfish").await;

        let session = gate
            .login("walt@breakingbad.com", "swordfish", store.as_ref())
            .await
            .unwrap();
        assert_eq!(session.user_id, user_id);
        assert_eq!(gate.authenticate_session(&bearer(&session.access_token)).unwrap(), user_id);

        assert!(matches!(
            gate.login("walt@breakingbad.com", "wrong", store.as_ref()).await,
            Err(AuthError::InvalidCredentials)
        ));

        let fresh = gate.refresh_session(&bearer(&session.refresh_token)).await.unwrap();
        assert_eq!(gate.authenticate_session(&bearer(&fresh)).unwrap(), user_id);

        gate.revoke_session(&bearer(&session.refresh_token)).await.unwrap();
        assert!(matches!(
            gate.refresh_session(&bearer(&session.refresh_token)).await,
            Err(AuthError::RefreshTokenExpiredOrRevoked)
        ));

        // Access tokens are stateless and outlive the revoked refresh token.
        assert_eq!(gate.authenticate_session(&bearer(&session.access_token)).unwrap(), user_id);
    }

    #[tokio::test]
    async fn test_unknown_email_is_distinct_from_wrong_password() {
        let store = Arc::new(MemoryStore::new());
        let gate = gate_with(store.clone(), Platform::Production);

        assert!(matches!(
            gate.login("nobody@example.com", "swordfish", store.as_ref()).await,
            Err(AuthError::UnknownAccount)
        ));
    }

    #[tokio::test]
    async fn test_live_refresh_token_is_not_rotated() {
        let store = Arc::new(MemoryStore::new());
        let gate = gate_with(store.clone(), Platform::Production);
        let user_id = register(&gate, &store, "a@example.com", "swordfish").await;
        let session = gate.login("a@example.com", "swordfish", store.as_ref()).await.unwrap();

        for _ in 0..5 {
            let token = gate.refresh_session(&bearer(&session.refresh_token)).await.unwrap();
            assert_eq!(gate.jwt().validate(&token).unwrap(), user_id);
        }
    }

    #[tokio::test]
    async fn test_revoke_twice_succeeds_and_unknown_token_fails() {
        let store = Arc::new(MemoryStore::new());
        let gate = gate_with(store.clone(), Platform::Production);
        register(&gate, &store, "a@example.com", "swordfish").await;
        let session = gate.login("a@example.com", "swordfish", store.as_ref()).await.unwrap();

        gate.revoke_session(&bearer(&session.refresh_token)).await.unwrap();
        gate.revoke_session(&bearer(&session.refresh_token)).await.unwrap();

        assert!(matches!(
            gate.revoke_session(&bearer("deadbeef")).await,
            Err(AuthError::RefreshTokenNotFound)
        ));
        assert!(matches!(
            gate.revoke_session(&HeaderMap::new()).await,
            Err(AuthError::MissingAuthorization)
        ));
    }

    #[test]
    fn test_authenticate_session_rejects_garbage() {
        let gate = gate_with(Arc::new(MemoryStore::new()), Platform::Production);

        for value in ["Bearer   ", "Bearer not.a.jwt", "Token abc"] {
            assert!(matches!(
                gate.authenticate_session(&headers(value)),
                Err(AppError::Unauthorized)
            ));
        }
        assert!(matches!(
            gate.authenticate_session(&HeaderMap::new()),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let gate = gate_with(Arc::new(MemoryStore::new()), Platform::Production);
        let opaque = "a".repeat(64);
        assert!(gate.authenticate_session(&bearer(&opaque)).is_err());
    }

    #[test]
    fn test_authorize_ownership() {
        let gate = gate_with(Arc::new(MemoryStore::new()), Platform::Production);
        let u = Uuid::new_v4();
        let v = Uuid::new_v4();

        assert!(gate.authorize_ownership(u, u));
        assert!(!gate.authorize_ownership(u, v));
    }

    #[test]
    fn test_authorize_webhook_exact_match() {
        let gate = gate_with(Arc::new(MemoryStore::new()), Platform::Production);

        assert!(gate.authorize_webhook(&headers(&format!("ApiKey {}", POLKA_KEY))));
        assert!(!gate.authorize_webhook(&headers("ApiKey wrong")));
        assert!(!gate.authorize_webhook(&headers(&format!("ApiKey {}x", POLKA_KEY))));
        assert!(!gate.authorize_webhook(&headers(&format!("Bearer {}", POLKA_KEY))));
        assert!(!gate.authorize_webhook(&HeaderMap::new()));
    }

    #[test]
    fn test_admin_action_requires_dev_platform() {
        let dev = gate_with(Arc::new(MemoryStore::new()), Platform::Dev);
        let prod = gate_with(Arc::new(MemoryStore::new()), Platform::Production);

        assert!(dev.authorize_admin_action());
        assert!(!prod.authorize_admin_action());
    }
}
