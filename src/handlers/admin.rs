//! 管理端处理器
//! 提供访问计数与开发环境重置

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::{error::AppError, middleware::AppState};

/// 指标响应
#[derive(Serialize)]
pub struct MetricsResponse {
    pub hits: u64,
}

/// 重置响应
#[derive(Serialize)]
pub struct ResetResponse {
    pub users_deleted: u64,
}

/// API 访问计数
pub async fn metrics(State(state): State<Arc<AppState>>) -> Json<MetricsResponse> {
    Json(MetricsResponse { hits: state.hits() })
}

/// 清空所有数据并重置计数，仅 dev 平台可用
pub async fn reset(State(state): State<Arc<AppState>>) -> Result<Json<ResetResponse>, AppError> {
    if !state.gate.authorize_admin_action() {
        tracing::warn!("Reset rejected outside dev platform");
        return Err(AppError::Forbidden);
    }

    let users_deleted = state.users.delete_all().await?;
    state.reset_hits();

    tracing::warn!(users_deleted, "All data reset");

    Ok(Json(ResetResponse { users_deleted }))
}
