//! HTTP 中间件
//! 应用状态、请求追踪、访问计数

use crate::{
    auth::AuthGate,
    config::AppConfig,
    error::Result,
    repository::{
        ChirpRepository, MemoryStore, PgChirpRepository, PgRefreshTokenRepository,
        PgUserRepository, UserRepository,
    },
};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use sqlx::PgPool;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "x-request-id";

tokio::task_local! {
    static REQUEST_ID: String;
}

/// 当前请求的 request_id；在请求追踪中间件之外调用时返回 `None`
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

/// 应用状态
///
/// 通过 `Arc<AppState>` 在所有请求间共享；服务本身不可变，
/// 唯一的可变状态是访问计数。
pub struct AppState {
    pub config: AppConfig,
    pub gate: Arc<AuthGate>,
    pub users: Arc<dyn UserRepository>,
    pub chirps: Arc<dyn ChirpRepository>,
    hits: AtomicU64,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        gate: Arc<AuthGate>,
        users: Arc<dyn UserRepository>,
        chirps: Arc<dyn ChirpRepository>,
    ) -> Self {
        Self {
            config,
            gate,
            users,
            chirps,
            hits: AtomicU64::new(0),
        }
    }

    /// 所有仓储都由同一个内存存储提供
    pub fn in_memory(config: AppConfig) -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        let gate = AuthGate::from_config(&config, store.clone())?;

        Ok(Self::new(config, Arc::new(gate), store.clone(), store))
    }

    /// PostgreSQL 仓储
    pub fn with_postgres(config: AppConfig, pool: PgPool) -> Result<Self> {
        let refresh_tokens = Arc::new(PgRefreshTokenRepository::new(pool.clone()));
        let gate = AuthGate::from_config(&config, refresh_tokens)?;

        Ok(Self::new(
            config,
            Arc::new(gate),
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgChirpRepository::new(pool)),
        ))
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn reset_hits(&self) {
        self.hits.store(0, Ordering::Relaxed);
    }
}

/// 请求追踪中间件
/// 为每个请求生成 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let request_id = extract_or_generate_request_id(req.headers());

    let method = req.method().to_string();
    let uri = req.uri().to_string();

    // 创建 span
    let span = tracing::info_span!(
        "http_request",
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    let scoped_id = request_id.clone();
    let tracked = async move {
        let start = Instant::now();

        let mut response = next.run(req).await;

        let elapsed = start.elapsed();

        // 记录指标 - 使用静态字符串
        let status = response.status().as_u16();
        let method_name = match method.as_str() {
            "GET" => "GET",
            "POST" => "POST",
            "PUT" => "PUT",
            "DELETE" => "DELETE",
            _ => "UNKNOWN",
        };
        let status_code = match status {
            200 => "200",
            201 => "201",
            204 => "204",
            400 => "400",
            401 => "401",
            403 => "403",
            404 => "404",
            409 => "409",
            500 => "500",
            _ => "other",
        };

        metrics::counter!("http_requests_total", "method" => method_name, "status" => status_code)
            .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            method = %method,
            uri = %uri,
            status = status,
            elapsed_ms = elapsed.as_millis(),
            "Request completed"
        );

        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }

        response
    }
    .instrument(span);

    REQUEST_ID.scope(scoped_id, tracked).await
}

/// API 访问计数中间件
pub async fn hit_counter_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let hits = state.hits.fetch_add(1, Ordering::Relaxed) + 1;
    metrics::counter!("chirpy_api_hits_total").increment(1);
    tracing::trace!(hits, "API hit recorded");

    next.run(req).await
}

/// 从请求头中提取或生成 request_id
fn extract_or_generate_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
