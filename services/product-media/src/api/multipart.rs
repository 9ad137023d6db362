//! multipart 上传表单读取
//!
//! 文件部分逐块写入暂存目录，文本部分收集为字段表

use std::collections::HashMap;
use std::path::Path;

use axum::extract::Multipart;
use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use catalog_errors::{AppError, AppResult};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::application::UploadProduct;
use crate::application::staging::{StagedFile, discard_all};
use crate::domain::{MAX_DETAIL_IMAGES, ProductAttributes};

pub const PRIMARY_FIELD: &str = "image";
pub const DETAIL_FIELD: &str = "detailproduct";

pub const BODY_TOO_LARGE_MESSAGE: &str = "Upload exceeds the request body limit.";
pub const MALFORMED_BODY_MESSAGE: &str = "Malformed multipart body.";

#[derive(Debug, Default)]
struct UploadForm {
    primary: Option<StagedFile>,
    details: Vec<StagedFile>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    async fn discard(&self) {
        if let Some(primary) = &self.primary {
            primary.discard().await;
        }
        discard_all(&self.details).await;
    }
}

/// 读取上传表单并解析商品属性
///
/// 任何校验失败都发生在上传之前，已暂存的文件会被删除
pub async fn read_upload_form(multipart: &mut Multipart, upload_dir: &Path) -> AppResult<UploadProduct> {
    let mut form = UploadForm::default();

    let result = match collect_parts(multipart, upload_dir, &mut form).await {
        Ok(()) => ProductAttributes::from_fields(&form.fields),
        Err(e) => Err(e),
    };

    match result {
        Ok(attributes) => Ok(UploadProduct {
            primary: form.primary,
            details: form.details,
            attributes,
        }),
        Err(e) => {
            form.discard().await;
            Err(e)
        }
    }
}

async fn collect_parts(multipart: &mut Multipart, upload_dir: &Path, form: &mut UploadForm) -> AppResult<()> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        let Some(file_name) = field.file_name().map(|f| f.trim().to_string()) else {
            let value = field.text().await.map_err(multipart_error)?;
            form.fields.insert(name, value);
            continue;
        };

        // 浏览器表单未选择文件时发送空文件名
        if file_name.is_empty() {
            debug!(field = %name, "Skipping file part without a file name");
            continue;
        }

        match name.as_str() {
            PRIMARY_FIELD if form.primary.is_some() => {
                debug!("Ignoring extra primary image part");
            }
            PRIMARY_FIELD => {
                form.primary = Some(stage(field, file_name, upload_dir).await?);
            }
            DETAIL_FIELD if form.details.len() >= MAX_DETAIL_IMAGES => {
                return Err(AppError::validation(format!(
                    "Too many {} files (max {})",
                    DETAIL_FIELD, MAX_DETAIL_IMAGES
                )));
            }
            DETAIL_FIELD => {
                let staged = stage(field, file_name, upload_dir).await?;
                form.details.push(staged);
            }
            other => {
                return Err(AppError::validation(format!("Unexpected file field: {}", other)));
            }
        }
    }

    Ok(())
}

async fn stage(mut field: Field<'_>, file_name: String, upload_dir: &Path) -> AppResult<StagedFile> {
    let content_type = field.content_type().map(str::to_string);
    let (staged, mut file) = StagedFile::create(upload_dir, file_name, content_type).await?;

    let written = async {
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok::<_, AppError>(())
    }
    .await;

    if let Err(e) = written {
        staged.discard().await;
        return Err(e);
    }

    debug!(path = %staged.path.display(), "Multipart file staged");
    Ok(staged)
}

fn multipart_error(e: MultipartError) -> AppError {
    let status = e.status();
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large(BODY_TOO_LARGE_MESSAGE)
    } else if status.is_server_error() {
        AppError::internal(format!("Failed to read multipart body: {}", e))
    } else {
        debug!(error = %e, "Rejecting malformed multipart body");
        AppError::validation(MALFORMED_BODY_MESSAGE)
    }
}

