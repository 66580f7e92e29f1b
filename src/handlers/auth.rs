//! 认证相关的 HTTP 处理器

use crate::{error::AppError, handlers::ApiJson, middleware::AppState, models::auth::*};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = state
        .gate
        .login(&req.email, &req.password, state.users.as_ref())
        .await?;

    let user = state
        .users
        .find_by_id(session.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    Ok(Json(LoginResponse {
        user: user.into(),
        token: session.access_token,
        refresh_token: session.refresh_token,
    }))
}

/// 用刷新令牌换取新的访问令牌
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let token = state.gate.refresh_session(&headers).await?;

    Ok(Json(RefreshResponse { token }))
}

/// 吊销刷新令牌
pub async fn revoke_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    state.gate.revoke_session(&headers).await?;

    Ok(StatusCode::NO_CONTENT)
}
