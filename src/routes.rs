//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
};

use crate::{handlers, middleware::AppState};

/// 请求体大小上限
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点
    let public_routes = Router::new()
        .route("/api/healthz", get(handlers::health::readiness))
        .route("/api/users", post(handlers::user::create_user))
        .route("/api/chirps", get(handlers::chirp::list_chirps))
        .route("/api/chirps/{chirp_id}", get(handlers::chirp::get_chirp));

    // 认证路由（刷新与吊销使用 Bearer 刷新令牌）
    let auth_routes = Router::new()
        .route("/api/login", post(handlers::auth::login))
        .route("/api/refresh", post(handlers::auth::refresh_token))
        .route("/api/revoke", post(handlers::auth::revoke_token));

    // Polka Webhook（ApiKey 鉴权）
    let webhook_routes = Router::new()
        .route("/api/polka/webhooks", post(handlers::webhook::polka_webhook))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::auth::middleware::polka_key_middleware,
        ));

    // 需要访问令牌的路由
    let authenticated_routes = Router::new()
        .route("/api/users", put(handlers::user::update_user))
        .route("/api/chirps", post(handlers::chirp::create_chirp))
        .route("/api/chirps/{chirp_id}", delete(handlers::chirp::delete_chirp))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::auth::middleware::jwt_auth_middleware,
        ));

    let api_routes = Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(webhook_routes)
        .merge(authenticated_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::hit_counter_middleware,
        ));

    // 管理端点
    let admin_routes = Router::new()
        .route("/admin/metrics", get(handlers::admin::metrics))
        .route("/admin/reset", post(handlers::admin::reset));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 组合所有路由
    Router::new()
        .merge(api_routes)
        .merge(admin_routes)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}
