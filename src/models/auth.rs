//! Authentication-related models

use super::user::UserResponse;
use serde::{Deserialize, Serialize};

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: the user plus a fresh access/refresh pair
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

/// Refresh response: a new access token only
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
}
