//! Credential extraction from the `Authorization` header

use super::AuthError;
use axum::http::{header::AUTHORIZATION, HeaderMap};

const BEARER_PREFIX: &str = "Bearer ";
const API_KEY_PREFIX: &str = "ApiKey ";

/// Extract a bearer token (`Authorization: Bearer <token>`).
///
/// The returned value is only a candidate; it still has to be validated.
pub fn extract_bearer(headers: &HeaderMap) -> Result<String, AuthError> {
    extract_with_prefix(headers, BEARER_PREFIX)
}

/// Extract the webhook API key (`Authorization: ApiKey <key>`).
pub fn extract_api_key(headers: &HeaderMap) -> Result<String, AuthError> {
    extract_with_prefix(headers, API_KEY_PREFIX)
}

fn extract_with_prefix(headers: &HeaderMap, prefix: &'static str) -> Result<String, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthorization)?
        .to_str()
        .map_err(|_| AuthError::MalformedAuthorization("header is not visible ASCII"))?;

    let credential = value
        .strip_prefix(prefix)
        .ok_or(AuthError::MalformedAuthorization("unexpected authorization scheme"))?
        .trim();

    if credential.is_empty() {
        return Err(AuthError::MalformedAuthorization("credential is empty"));
    }

    Ok(credential.to_string())
}
