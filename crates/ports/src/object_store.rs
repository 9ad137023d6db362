//! 对象存储 trait 定义

use std::path::Path;

use async_trait::async_trait;
use catalog_errors::AppResult;
use serde::{Deserialize, Serialize};

/// 上传选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// 目标对象名
    pub destination: String,
    /// Content-Type，未知时由存储端推断
    pub content_type: Option<String>,
    /// 是否公开可读
    pub public: bool,
}

impl UploadOptions {
    pub fn public(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            content_type: None,
            public: true,
        }
    }

    pub fn with_content_type(mut self, content_type: Option<String>) -> Self {
        self.content_type = content_type;
        self
    }
}

/// 已存储对象
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    /// 对象名
    pub name: String,
    /// 公开下载地址
    pub media_link: String,
}

/// 对象存储 trait
#[async_trait]
pub trait ObjectStorePort: Send + Sync {
    /// 上传本地文件并返回对象信息
    async fn upload_file(&self, local_path: &Path, options: &UploadOptions) -> AppResult<StoredObject>;
}
