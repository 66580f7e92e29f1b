//! 用户管理的 HTTP 处理器

use crate::{
    auth::{middleware::AuthContext, PasswordHasher},
    error::AppError,
    handlers::ApiJson,
    middleware::AppState,
    models::user::*,
};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use validator::Validate;

/// 注册用户
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    // 验证密码策略
    PasswordHasher::validate_password_policy(&req.password, &state.config.security)?;

    let password_hash = state.gate.hasher().hash_blocking(req.password).await?;

    let user = state.users.create(&req.email, &password_hash).await?;

    tracing::info!(user_id = %user.id, "User created");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// 更新当前用户的邮箱与密码
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    PasswordHasher::validate_password_policy(&req.password, &state.config.security)?;

    let password_hash = state.gate.hasher().hash_blocking(req.password).await?;

    let user = state
        .users
        .update_credentials(auth_context.user_id, &req.email, &password_hash)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    tracing::info!(user_id = %user.id, "User credentials updated");

    Ok(Json(UserResponse::from(user)))
}
