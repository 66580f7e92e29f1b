//! 健康检查处理器
//! 提供 /api/healthz 端点

/// 存活探针
/// 快速响应，不检查依赖
pub async fn readiness() -> &'static str {
    "OK"
}
