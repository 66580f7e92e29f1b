//! Chirpy 主入口

use chirpy::{config::AppConfig, db, middleware::AppState, routes, telemetry};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::Notify;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    let mut in_memory = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--version" => {
                println!("chirpy {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            "--in-memory" => in_memory = true,
            _ => {
                eprintln!("未知参数: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // 加载 .env 文件（开发环境），生产环境直接设置环境变量
    dotenv::from_filename(".env.local").ok();
    dotenv::dotenv().ok();

    // 1. 加载配置
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志
    telemetry::init_telemetry(&config.logging);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        platform = ?config.platform,
        in_memory,
        "Chirpy starting"
    );

    // 3. 构建应用状态
    let app_state = if in_memory {
        tracing::warn!("Using in-memory storage; data is lost on exit");
        AppState::in_memory(config.clone())?
    } else {
        let pool = db::connect(&config.database).await?;
        AppState::with_postgres(config.clone(), pool)?
    };

    // 4. 构建路由
    let app = routes::create_router(Arc::new(app_state));

    // 5. 启动服务器
    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, "Server listening");

    // 6. 优雅关闭，超时后强制退出
    let shutdown = Arc::new(Notify::new());
    let notifier = shutdown.clone();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        notifier.notify_one();
    });
    let timeout = Duration::from_secs(config.server.graceful_shutdown_timeout_secs);

    tokio::select! {
        result = async move { server.await } => result?,
        _ = async {
            shutdown.notified().await;
            tokio::time::sleep(timeout).await;
        } => {
            tracing::warn!("Graceful shutdown timeout reached, forcing exit");
        }
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 优雅关闭信号处理
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }
}

/// 打印帮助信息
fn print_help() {
    println!("chirpy {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: chirpy [选项]");
    println!();
    println!("选项:");
    println!("  --in-memory   使用内存存储运行（无需 PostgreSQL）");
    println!("  --version     打印版本信息并退出");
    println!("  --help        打印此帮助信息并退出");
    println!();
    println!("环境变量:");
    println!("  所有配置通过 CHIRPY_ 前缀的环境变量完成，例如");
    println!("  CHIRPY_DATABASE__URL, CHIRPY_SECURITY__JWT_SECRET, CHIRPY_SECURITY__POLKA_KEY");
}
