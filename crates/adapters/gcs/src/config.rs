//! GCS 适配器配置

use secrecy::Secret;

/// 读写对象所需的 OAuth2 scope
pub const DEVSTORAGE_READ_WRITE: &str = "https://www.googleapis.com/auth/devstorage.read_write";

/// 服务账号凭据
#[derive(Debug, Clone)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key_id: Option<String>,
    pub private_key: Secret<String>,
    pub token_uri: String,
}

/// GCS 客户端配置
#[derive(Debug, Clone)]
pub struct GcsConfig {
    pub bucket: String,
    /// JSON API 根地址，测试或模拟器时可替换
    pub api_base_url: String,
    pub scope: String,
}

impl GcsConfig {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            api_base_url: "https://storage.googleapis.com".to_string(),
            scope: DEVSTORAGE_READ_WRITE.to_string(),
        }
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// 媒体上传端点
    pub fn upload_endpoint(&self) -> String {
        format!(
            "{}/upload/storage/v1/b/{}/o",
            self.api_base_url,
            urlencoding::encode(&self.bucket)
        )
    }
}
