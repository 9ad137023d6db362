//! 上传暂存文件

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use catalog_common::random_id;
use catalog_errors::{AppError, AppResult};
use tokio::fs::File;
use tracing::warn;

/// 暂存在本地的上传文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// 暂存路径（随机文件名）
    pub path: PathBuf,
    /// 客户端提供的原始文件名（非空）
    pub original_name: String,
    pub content_type: Option<String>,
}

impl StagedFile {
    /// 在暂存目录下创建随机命名的空文件
    pub async fn create(
        dir: &Path,
        original_name: String,
        content_type: Option<String>,
    ) -> AppResult<(Self, File)> {
        let path = dir.join(random_id().simple().to_string());
        let file = File::create(&path).await.map_err(|e| {
            AppError::internal(format!("Failed to stage upload at {}: {}", path.display(), e))
        })?;

        Ok((
            Self {
                path,
                original_name,
                content_type,
            },
            file,
        ))
    }

    /// 对象存储中的目标名
    pub fn destination(&self) -> &str {
        &self.original_name
    }

    /// 删除暂存文件
    pub async fn remove(&self) -> AppResult<()> {
        tokio::fs::remove_file(&self.path).await.map_err(|e| {
            AppError::internal(format!(
                "Failed to delete staged file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// 尽力删除，文件已不存在时静默
    pub async fn discard(&self) {
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "Failed to discard staged file");
            }
        }
    }
}

/// 尽力删除一组暂存文件
pub async fn discard_all(files: &[StagedFile]) {
    for file in files {
        file.discard().await;
    }
}
