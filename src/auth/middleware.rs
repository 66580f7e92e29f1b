//! JWT 认证中间件

use crate::{error::AppError, middleware::AppState};
use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

/// 认证上下文（附加到请求扩展）
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    pub user_id: Uuid,
}

// 实现 FromRequestParts 以便在 handler 中直接提取 AuthContext
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or(AppError::Unauthorized)
    }
}

/// JWT 认证中间件 - 必须认证
pub async fn jwt_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = state.gate.authenticate_session(req.headers())?;

    // 附加到请求扩展
    req.extensions_mut().insert(AuthContext { user_id });

    Ok(next.run(req).await)
}

/// Polka Webhook 鉴权中间件，在读取请求体之前校验 ApiKey
pub async fn polka_key_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state.gate.authorize_webhook(req.headers()) {
        tracing::warn!("Polka webhook rejected: bad API key");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(req).await)
}
