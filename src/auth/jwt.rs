//! JWT access token generation and validation
//! HS256 signed, stateless; revocation lives on the refresh token side

use super::AuthError;
use crate::config::SecurityConfig;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer label stamped into every access token
pub const TOKEN_ISSUER: &str = "chirpy";

/// JWT claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,
}

/// JWT service
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_token_ttl: Duration,
}

impl JwtService {
    /// Create a service keyed by `secret`
    pub fn new(secret: &[u8], access_token_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by hand against an explicit clock with zero leeway.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_token_ttl,
        }
    }

    /// Create JWT service from config
    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(
            config.jwt_secret.expose_secret().as_bytes(),
            Duration::seconds(config.access_token_exp_secs as i64),
        )
    }

    /// Lifetime used by [`JwtService::issue_access_token`]
    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }

    /// Issue an access token with the configured lifetime
    pub fn issue_access_token(&self, subject: Uuid) -> Result<String, AuthError> {
        self.issue(subject, self.access_token_ttl)
    }

    /// Issue a token for `subject` valid for `ttl` from now.
    ///
    /// A non-positive `ttl` still yields a token; it is simply already expired.
    pub fn issue(&self, subject: Uuid, ttl: Duration) -> Result<String, AuthError> {
        self.issue_at(subject, ttl, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(
        &self,
        subject: Uuid,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            sub: subject.to_string(),
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode access token: {:?}", e);
            AuthError::Signing(e.to_string())
        })
    }

    /// Validate a token and return its principal
    pub fn validate(&self, token: &str) -> Result<Uuid, AuthError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a token against the clock value `now`
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {:?}", e);
                AuthError::InvalidToken(e.to_string())
            })?
            .claims;

        if now.timestamp() >= claims.exp {
            tracing::debug!(exp = claims.exp, "Token expired");
            return Err(AuthError::TokenExpired);
        }

        Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidSubject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_secret_key_32_characters_long!";

    fn service() -> JwtService {
        JwtService::new(SECRET, Duration::hours(1))
    }

    #[test]
    fn test_generate_and_validate_access_token() {
        let service = service();
        let user_id = Uuid::new_v4();

        let token = service.issue_access_token(user_id).unwrap();

        assert_eq!(service.validate(&token).unwrap(), user_id);
    }

    #[test]
    fn test_expired_after_ttl() {
        let service = service();
        let user_id = Uuid::new_v4();
        let issued = Utc::now();

        let token = service.issue_at(user_id, Duration::seconds(30), issued).unwrap();

        assert_eq!(service.validate_at(&token, issued).unwrap(), user_id);
        assert_eq!(
            service
                .validate_at(&token, issued + Duration::seconds(29))
                .unwrap(),
            user_id
        );
        assert!(matches!(
            service.validate_at(&token, issued + Duration::seconds(30)),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_non_positive_ttl_is_issued_but_already_expired() {
        let service = service();
        let user_id = Uuid::new_v4();

        let zero = service.issue(user_id, Duration::zero()).unwrap();
        let negative = service.issue(user_id, Duration::hours(-1)).unwrap();

        assert!(!zero.is_empty());
        assert!(matches!(service.validate(&zero), Err(AuthError::TokenExpired)));
        assert!(matches!(service.validate(&negative), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret_fails() {
        let token = service().issue_access_token(Uuid::new_v4()).unwrap();
        let other = JwtService::new(b"another_secret_key_32_characters!!", Duration::hours(1));

        assert!(matches!(other.validate(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_invalid_token_fails() {
        let service = service();
        assert!(service.validate("invalid_token").is_err());
        assert!(service.validate("invalid.token.string").is_err());
        assert!(service.validate("").is_err());
    }

    #[test]
    fn test_non_uuid_subject_is_rejected() {
        let now = Utc::now();
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(matches!(service().validate(&token), Err(AuthError::InvalidSubject)));
    }

    #[test]
    fn test_foreign_issuer_is_rejected() {
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iss: "someone-else".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(service().validate(&token).is_err());
    }
}
