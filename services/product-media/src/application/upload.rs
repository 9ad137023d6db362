//! 商品上传用例

use std::sync::Arc;

use catalog_errors::{AppError, AppResult};
use catalog_ports::{ObjectStorePort, UploadOptions};
use tracing::{debug, info, warn};

use super::staging::{StagedFile, discard_all};
use crate::domain::{DetailImage, NewProduct, Product, ProductAttributes, ProductRepository};

pub const NO_IMAGE_MESSAGE: &str = "No image files were uploaded.";

/// 上传命令
#[derive(Debug, Clone, Default)]
pub struct UploadProduct {
    /// 主图
    pub primary: Option<StagedFile>,
    /// 详情图，按表单顺序
    pub details: Vec<StagedFile>,
    pub attributes: ProductAttributes,
}

/// 上传服务
///
/// 主图与详情图逐个上传到对象存储后写入仓储，不做补偿
pub struct UploadService {
    store: Arc<dyn ObjectStorePort>,
    repository: Arc<dyn ProductRepository>,
}

impl UploadService {
    pub fn new(store: Arc<dyn ObjectStorePort>, repository: Arc<dyn ProductRepository>) -> Self {
        Self { store, repository }
    }

    /// 执行上传；失败时清理仍存在的暂存文件
    pub async fn upload(&self, command: UploadProduct) -> AppResult<Product> {
        let Some(primary) = command.primary.as_ref() else {
            discard_all(&command.details).await;
            metrics::counter!("product_uploads_total", "status" => "rejected").increment(1);
            return Err(AppError::validation(NO_IMAGE_MESSAGE));
        };

        match self.store_and_record(primary, &command).await {
            Ok(product) => {
                metrics::counter!("product_uploads_total", "status" => "success").increment(1);
                info!(
                    product_id = %product.id,
                    detail_images = product.detail_images.len(),
                    "Product uploaded"
                );
                Ok(product)
            }
            Err(e) => {
                primary.discard().await;
                discard_all(&command.details).await;
                metrics::counter!("product_uploads_total", "status" => "failed").increment(1);
                Err(e)
            }
        }
    }

    async fn store_and_record(&self, primary: &StagedFile, command: &UploadProduct) -> AppResult<Product> {
        let image_url = self.push(primary).await?;

        let mut detail_images = Vec::with_capacity(command.details.len());
        for detail in &command.details {
            let url = self.push(detail).await?;
            detail.remove().await?;
            detail_images.push(DetailImage::new(url));
        }

        let product = self
            .repository
            .insert(NewProduct::new(image_url, command.attributes.clone(), detail_images))
            .await?;

        if let Err(e) = primary.remove().await {
            warn!(product_id = %product.id, error = %e, "Product stored but primary staged file remains");
            return Err(e);
        }

        Ok(product)
    }

    async fn push(&self, file: &StagedFile) -> AppResult<String> {
        let options = UploadOptions::public(file.destination()).with_content_type(file.content_type.clone());
        let stored = self.store.upload_file(&file.path, &options).await?;
        debug!(object = %stored.name, "Staged file uploaded");
        Ok(stored.media_link)
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use async_trait::async_trait;
    use catalog_ports::StoredObject;
    use tokio::sync::Mutex;

    use super::*;
    use crate::infrastructure::persistence::InMemoryProductRepository;

    /// 记录上传顺序；上传时检查此前的详情图暂存文件已被删除
    #[derive(Default)]
    struct RecordingStore {
        uploads: Mutex<Vec<(String, PathBuf)>>,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl ObjectStorePort for RecordingStore {
        async fn upload_file(&self, local_path: &Path, options: &UploadOptions) -> AppResult<StoredObject> {
            if self.fail_on.as_deref() == Some(options.destination.as_str()) {
                return Err(AppError::storage("bucket unavailable"));
            }
            assert!(local_path.exists(), "staged file must exist while uploading");
            assert!(options.public);

            let mut uploads = self.uploads.lock().await;
            // 第一个是主图，其余详情图在下一次上传前已删除
            for (_, previous) in uploads.iter().skip(1) {
                assert!(!previous.exists());
            }
            uploads.push((options.destination.clone(), local_path.to_path_buf()));

            Ok(StoredObject {
                name: options.destination.clone(),
                media_link: format!("https://storage.test/{}", options.destination),
            })
        }
    }

    async fn stage(dir: &Path, name: &str) -> StagedFile {
        let (file, _) = StagedFile::create(dir, name.to_string(), Some("image/png".to_string()))
            .await
            .unwrap();
        file
    }

    fn assert_send<T: Send>(_: &T) {}

    #[tokio::test]
    async fn test_upload_future_is_send() {
        let service = UploadService::new(
            Arc::new(RecordingStore::default()),
            Arc::new(InMemoryProductRepository::new()),
        );
        // axum 处理器要求 Future: Send
        let future = service.upload(UploadProduct::default());
        assert_send(&future);
        assert!(future.await.is_err());
    }

    #[tokio::test]
    async fn test_upload_primary_and_details() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(RecordingStore::default());
        let repo = Arc::new(InMemoryProductRepository::new());
        let service = UploadService::new(store.clone(), repo.clone());

        let command = UploadProduct {
            primary: Some(stage(dir.path(), "main.png").await),
            details: vec![stage(dir.path(), "d1.png").await, stage(dir.path(), "d2.png").await],
            attributes: ProductAttributes {
                name: Some("Kursi".into()),
                ..Default::default()
            },
        };

        let product = service.upload(command).await.unwrap();

        assert_eq!(product.image_url, "https://storage.test/main.png");
        assert_eq!(
            product.detail_images,
            vec![
                DetailImage::new("https://storage.test/d1.png"),
                DetailImage::new("https://storage.test/d2.png"),
            ]
        );
        assert_eq!(product.name.as_deref(), Some("Kursi"));

        let order: Vec<String> = store.uploads.lock().await.iter().map(|(d, _)| d.clone()).collect();
        assert_eq!(order, vec!["main.png", "d1.png", "d2.png"]);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_primary_is_rejected_and_details_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(RecordingStore::default());
        let repo = Arc::new(InMemoryProductRepository::new());
        let service = UploadService::new(store.clone(), repo.clone());

        let command = UploadProduct {
            primary: None,
            details: vec![stage(dir.path(), "d1.png").await],
            attributes: ProductAttributes::default(),
        };

        let err = service.upload(command).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.message(), NO_IMAGE_MESSAGE);
        assert!(store.uploads.lock().await.is_empty());
        assert!(repo.find_all().await.unwrap().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_cleans_up_and_creates_no_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(RecordingStore {
            fail_on: Some("d2.png".to_string()),
            ..Default::default()
        });
        let repo = Arc::new(InMemoryProductRepository::new());
        let service = UploadService::new(store.clone(), repo.clone());

        let command = UploadProduct {
            primary: Some(stage(dir.path(), "main.png").await),
            details: vec![stage(dir.path(), "d1.png").await, stage(dir.path(), "d2.png").await],
            attributes: ProductAttributes::default(),
        };

        let err = service.upload(command).await.unwrap_err();

        assert!(!err.is_client_error());
        // 已上传的对象不回滚
        assert_eq!(store.uploads.lock().await.len(), 2);
        assert!(repo.find_all().await.unwrap().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
