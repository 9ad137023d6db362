//! catalog-config - 配置加载库
//!
//! 加载顺序（后者覆盖前者）：
//! 1. 字段默认值
//! 2. `{config_dir}/default.toml`、`{config_dir}/{APP_ENV}.toml`
//! 3. 旧部署沿用的扁平环境变量（`PORT`、`MONGODB_URI`、`PRIVATE_KEY` 等）
//! 4. `APP_<SECTION>__<KEY>` 形式的嵌套环境变量

use figment::{
    Figment,
    providers::{Env, Format, Toml},
    value::{Uncased, UncasedStr},
};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// 为空时允许任意来源
    #[serde(default, deserialize_with = "string_or_list")]
    pub cors_allowed_origins: Vec<String>,
    /// 请求体上限（字节）
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_allowed_origins: Vec::new(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    7000
}

fn default_body_limit() -> usize {
    64 * 1024 * 1024
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    match std::env::var("APP_ENV").as_deref() {
        Ok("production") => 50,
        _ => 10,
    }
}

/// 对象存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub bucket: String,
    /// 上传文件的本地暂存目录
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_api_base_url() -> String {
    "https://storage.googleapis.com".to_string()
}

/// Google 服务账号凭据
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountConfig {
    #[serde(rename = "type", default = "default_account_type")]
    pub account_type: String,
    pub project_id: Option<String>,
    pub private_key_id: Option<String>,
    pub private_key: Secret<String>,
    pub client_email: String,
    pub client_id: Option<String>,
    pub auth_uri: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub auth_provider_x509_cert_url: Option<String>,
    pub client_x509_cert_url: Option<String>,
}

fn default_account_type() -> String {
    "service_account".to_string()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub service_account: ServiceAccountConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

fn default_app_name() -> String {
    "product-media".to_string()
}

fn default_app_env() -> String {
    "development".to_string()
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment(config_dir))
    }

    /// 组装配置来源
    pub fn figment(config_dir: &str) -> Figment {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| default_app_env());

        Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::raw().filter_map(legacy_key))
            .merge(Env::prefixed("APP_").split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let mut config: Self = figment.extract()?;

        // 私钥常以转义后的单行形式放在 .env 中
        let key = config.service_account.private_key.expose_secret().replace("\\n", "\n");
        config.service_account.private_key = Secret::new(key);

        Ok(config)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}

/// 旧部署的扁平环境变量到配置路径的映射
fn legacy_key(key: &UncasedStr) -> Option<Uncased<'_>> {
    let path = match key.as_str().to_ascii_uppercase().as_str() {
        "APP_NAME" => "app_name",
        "APP_ENV" => "app_env",
        "HOST" => "server.host",
        "PORT" => "server.port",
        "CORS_ALLOWED_ORIGINS" => "server.cors_allowed_origins",
        "MONGODB_URI" | "DATABASE_URL" => "database.url",
        "STORAGE_BUCKET" => "storage.bucket",
        "UPLOAD_DIR" => "storage.upload_dir",
        "PROJECT_ID" => "service_account.project_id",
        "PRIVATE_KEY_ID" => "service_account.private_key_id",
        "PRIVATE_KEY" => "service_account.private_key",
        "CLIENT_EMAIL" => "service_account.client_email",
        "CLIENT_ID" => "service_account.client_id",
        "AUTH_URI" => "service_account.auth_uri",
        "TOKEN_URI" => "service_account.token_uri",
        "AUTH_PROVIDER_CERT_URL" => "service_account.auth_provider_x509_cert_url",
        "CLIENT_CERT_URL" => "service_account.client_x509_cert_url",
        "LOG_LEVEL" => "telemetry.log_level",
        _ => return None,
    };
    Some(path.into())
}

/// 接受逗号分隔的字符串或数组
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        One(String),
        Many(Vec<String>),
    }

    let items = match Raw::deserialize(deserializer)? {
        Raw::One(s) => s.split(',').map(str::to_string).collect(),
        Raw::Many(v) => v,
    };

    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}
