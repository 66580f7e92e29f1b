//! Authentication and authorization module

pub mod extract;
pub mod gate;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod refresh;

pub use extract::{extract_api_key, extract_bearer};
pub use gate::{AuthGate, Session};
pub use jwt::{Claims, JwtService, TOKEN_ISSUER};
pub use middleware::{jwt_auth_middleware, AuthContext};
pub use password::PasswordHasher;
pub use refresh::{RefreshRecord, RefreshTokenService};

use crate::error::AppError;
use thiserror::Error;

/// Failures raised inside the auth core.
///
/// The variants stay distinguishable so callers can log the precise reason,
/// but every credential problem collapses to `401` once converted into
/// [`AppError`].
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization header is missing")]
    MissingAuthorization,

    #[error("malformed authorization header: {0}")]
    MalformedAuthorization(&'static str),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    TokenExpired,

    #[error("token subject is not a valid principal id")]
    InvalidSubject,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("no account for this email")]
    UnknownAccount,

    #[error("refresh token not found")]
    RefreshTokenNotFound,

    #[error("refresh token expired or revoked")]
    RefreshTokenExpiredOrRevoked,

    #[error("failed to sign token: {0}")]
    Signing(String),

    #[error("failed to hash password: {0}")]
    Hashing(String),

    #[error(transparent)]
    Storage(#[from] AppError),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingAuthorization
            | AuthError::MalformedAuthorization(_)
            | AuthError::InvalidToken(_)
            | AuthError::TokenExpired
            | AuthError::InvalidSubject
            | AuthError::InvalidCredentials
            | AuthError::RefreshTokenNotFound
            | AuthError::RefreshTokenExpiredOrRevoked => AppError::Unauthorized,
            AuthError::UnknownAccount => AppError::not_found("user"),
            AuthError::Signing(msg) | AuthError::Hashing(msg) => AppError::Internal(msg),
            AuthError::Storage(e) => e,
        }
    }
}
