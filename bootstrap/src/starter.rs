//! 服务启动器
//!
//! 提供统一的 HTTP 服务启动模式

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use catalog_config::AppConfig;
use catalog_errors::AppResult;
use catalog_telemetry::init_metrics;
use tracing::{info, warn};

use crate::infrastructure::Infrastructure;
use crate::runtime::{init_runtime, shutdown_signal};

/// 运行 HTTP 服务
///
/// 1. 加载配置（含 `.env`）
/// 2. 初始化日志与 Prometheus 记录器
/// 3. 创建基础设施资源
/// 4. 调用闭包构建路由
/// 5. 监听端口并处理 graceful shutdown
///
/// # 示例
///
/// ```ignore
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     catalog_bootstrap::run_http("config", |infra| async move {
///         Ok(my_service::router(infra))
///     })
///     .await
/// }
/// ```
pub async fn run_http<F, Fut>(config_dir: &str, app_builder: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(Infrastructure) -> Fut,
    Fut: Future<Output = AppResult<Router>>,
{
    dotenvy::dotenv().ok();

    let config = AppConfig::load(config_dir)?;
    init_runtime(&config);

    info!("Starting {} service", config.app_name);

    let metrics = match init_metrics() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Prometheus recorder not installed, /metrics disabled");
            None
        }
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let infra = Infrastructure::from_config(config, metrics).await?;
    let app = app_builder(infra).await?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Server is running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Service stopped");

    Ok(())
}
