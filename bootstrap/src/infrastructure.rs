//! 基础设施资源管理
//!
//! 进程启动时创建一次，之后以共享句柄注入到各个 handler

use std::path::{Path, PathBuf};
use std::sync::Arc;

use catalog_adapter_gcs::{GcsConfig, GcsObjectStore, ServiceAccountKey};
use catalog_adapter_postgres::{PostgresConfig, create_pool};
use catalog_common::{RetryConfig, with_retry};
use catalog_config::AppConfig;
use catalog_errors::{AppError, AppResult};
use catalog_ports::ObjectStorePort;
use metrics_exporter_prometheus::PrometheusHandle;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tracing::info;

/// 基础设施资源容器
pub struct Infrastructure {
    /// 应用配置
    config: AppConfig,
    /// PostgreSQL 连接池
    postgres_pool: PgPool,
    /// 对象存储客户端
    object_store: Arc<dyn ObjectStorePort>,
    /// 上传暂存目录
    upload_dir: PathBuf,
    /// Prometheus 导出句柄
    metrics: Option<PrometheusHandle>,
}

impl Infrastructure {
    /// 从配置创建基础设施资源（数据库连接带重试）
    pub async fn from_config(config: AppConfig, metrics: Option<PrometheusHandle>) -> AppResult<Self> {
        let retry_config = RetryConfig::default();

        let pg_config = PostgresConfig::new(config.database.url.expose_secret())
            .with_max_connections(config.database.max_connections);
        let postgres_pool = with_retry(&retry_config, "PostgreSQL connection", || {
            let cfg = pg_config.clone();
            async move { create_pool(&cfg).await }
        })
        .await?;
        info!(
            max_connections = config.database.max_connections,
            "PostgreSQL connection pool created"
        );

        let object_store = Arc::new(build_object_store(&config)?);

        let upload_dir = prepare_upload_dir(Path::new(&config.storage.upload_dir)).await?;
        info!(upload_dir = %upload_dir.display(), "Upload staging directory ready");

        Ok(Self {
            config,
            postgres_pool,
            object_store,
            upload_dir,
            metrics,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn postgres_pool(&self) -> PgPool {
        self.postgres_pool.clone()
    }

    pub fn object_store(&self) -> Arc<dyn ObjectStorePort> {
        self.object_store.clone()
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn metrics(&self) -> Option<PrometheusHandle> {
        self.metrics.clone()
    }
}

/// 按服务账号配置创建 GCS 客户端
pub fn build_object_store(config: &AppConfig) -> AppResult<GcsObjectStore> {
    let account = &config.service_account;
    if account.account_type != "service_account" {
        return Err(AppError::config(format!(
            "Unsupported credential type: {}",
            account.account_type
        )));
    }

    let key = ServiceAccountKey {
        client_email: account.client_email.clone(),
        private_key_id: account.private_key_id.clone(),
        private_key: account.private_key.clone(),
        token_uri: account.token_uri.clone(),
    };
    let gcs_config =
        GcsConfig::new(&config.storage.bucket).with_api_base_url(&config.storage.api_base_url);

    GcsObjectStore::from_service_account(gcs_config, key)
}

/// 确保暂存目录存在
pub async fn prepare_upload_dir(dir: &Path) -> AppResult<PathBuf> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        AppError::config(format!("Failed to create upload dir {}: {}", dir.display(), e))
    })?;
    Ok(dir.to_path_buf())
}
