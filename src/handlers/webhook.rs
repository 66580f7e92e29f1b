//! Polka 计费 Webhook 处理器
//! ApiKey 由 `polka_key_middleware` 在读取请求体之前校验

use crate::{
    error::AppError,
    middleware::AppState,
    models::webhook::{PolkaEvent, USER_UPGRADED_EVENT},
};
use axum::{body::Bytes, extract::State, http::StatusCode};
use std::sync::Arc;
use uuid::Uuid;

/// 处理 Polka 事件；未知事件直接确认
///
/// 请求体按 JSON 解析，不要求 `Content-Type` 头。
pub async fn polka_webhook(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let event: PolkaEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {}", e)))?;

    if event.event != USER_UPGRADED_EVENT {
        tracing::debug!(event = %event.event, "Ignoring Polka event");
        return Ok(StatusCode::NO_CONTENT);
    }

    let user_id = Uuid::parse_str(&event.data.user_id)
        .map_err(|_| AppError::BadRequest("Invalid user_id".to_string()))?;

    if !state.users.upgrade_to_chirpy_red(user_id).await? {
        return Err(AppError::not_found("user"));
    }

    tracing::info!(user_id = %user_id, "User upgraded to Chirpy Red");

    Ok(StatusCode::NO_CONTENT)
}
