//! GCS 对象存储客户端

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use catalog_errors::{AppError, AppResult};
use catalog_ports::{ObjectStorePort, StoredObject, UploadOptions};
use metrics::{counter, histogram};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::{GcsConfig, ServiceAccountKey};
use crate::error::{map_status_error, map_transport_error};
use crate::token::{ServiceAccountTokenSource, TokenSource};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// JSON API 返回的对象资源（只取用到的字段）
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectResource {
    pub name: String,
    pub bucket: String,
    pub media_link: String,
}

/// Google Cloud Storage 客户端
pub struct GcsObjectStore {
    http: reqwest::Client,
    config: GcsConfig,
    tokens: Arc<dyn TokenSource>,
}

impl GcsObjectStore {
    pub fn new(http: reqwest::Client, config: GcsConfig, tokens: Arc<dyn TokenSource>) -> Self {
        Self { http, config, tokens }
    }

    /// 使用服务账号凭据创建客户端
    pub fn from_service_account(config: GcsConfig, key: ServiceAccountKey) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("catalog-adapter-gcs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {}", e)))?;
        let tokens = ServiceAccountTokenSource::new(http.clone(), key, config.scope.clone())?;

        info!(bucket = %config.bucket, "GCS client created");
        Ok(Self::new(http, config, Arc::new(tokens)))
    }

    /// 简单媒体上传（uploadType=media）
    pub async fn insert_object(&self, body: Vec<u8>, options: &UploadOptions) -> AppResult<ObjectResource> {
        let token = self.tokens.access_token().await?;
        let content_type = options.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE);

        let mut query = vec![("uploadType", "media"), ("name", options.destination.as_str())];
        if options.public {
            query.push(("predefinedAcl", "publicRead"));
        }

        debug!(
            bucket = %self.config.bucket,
            object = %options.destination,
            bytes = body.len(),
            "Uploading object"
        );

        let response = self
            .http
            .post(self.config.upload_endpoint())
            .query(&query)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| map_transport_error(e, "Uploading object"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status_error(status, &body, "Uploading object"));
        }

        response
            .json::<ObjectResource>()
            .await
            .map_err(|e| map_transport_error(e, "Decoding object resource"))
    }
}

#[async_trait]
impl ObjectStorePort for GcsObjectStore {
    async fn upload_file(&self, local_path: &Path, options: &UploadOptions) -> AppResult<StoredObject> {
        let started = Instant::now();
        let body = tokio::fs::read(local_path).await.map_err(|e| {
            AppError::internal(format!("Failed to read {}: {}", local_path.display(), e))
        })?;

        let result = self.insert_object(body, options).await;

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        counter!("object_store_uploads_total", "success" => result.is_ok().to_string()).increment(1);
        histogram!("object_store_upload_duration_ms").record(elapsed_ms);

        match result {
            Ok(object) => {
                info!(
                    bucket = %object.bucket,
                    object = %object.name,
                    elapsed_ms,
                    "Object uploaded"
                );
                Ok(StoredObject {
                    name: object.name,
                    media_link: object.media_link,
                })
            }
            Err(e) => {
                warn!(object = %options.destination, error = %e, "Object upload failed");
                Err(e)
            }
        }
    }
}
