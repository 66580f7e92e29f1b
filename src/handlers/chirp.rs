//! Chirp 的 HTTP 处理器

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    handlers::{ApiJson, ApiPath, ApiQuery},
    middleware::AppState,
    models::chirp::*,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// 发布 chirp，作者为当前用户
pub async fn create_chirp(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    ApiJson(req): ApiJson<CreateChirpRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let body = clean_body(&req.body);
    let chirp = state.chirps.create(&body, auth_context.user_id).await?;

    tracing::info!(chirp_id = %chirp.id, user_id = %chirp.user_id, "Chirp created");

    Ok((StatusCode::CREATED, Json(chirp)))
}

/// 列出 chirp，可按作者过滤并按创建时间排序
pub async fn list_chirps(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<ChirpListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let chirps = state.chirps.list(query.author_id, query.sort).await?;

    Ok(Json(chirps))
}

/// 获取 chirp 详情
pub async fn get_chirp(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let chirp = state
        .chirps
        .find(id)
        .await?
        .ok_or_else(|| AppError::not_found("chirp"))?;

    Ok(Json(chirp))
}

/// 删除 chirp，仅作者本人可删除
pub async fn delete_chirp(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let owner = state
        .chirps
        .find_owner(id)
        .await?
        .ok_or_else(|| AppError::not_found("chirp"))?;

    if !state.gate.authorize_ownership(auth_context.user_id, owner) {
        tracing::warn!(
            chirp_id = %id,
            user_id = %auth_context.user_id,
            "Chirp deletion denied: not the author"
        );
        return Err(AppError::Forbidden);
    }

    if !state.chirps.delete(id).await? {
        return Err(AppError::not_found("chirp"));
    }

    tracing::info!(chirp_id = %id, "Chirp deleted");

    Ok(StatusCode::NO_CONTENT)
}
