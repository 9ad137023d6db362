//! 路由共享状态

use std::path::PathBuf;
use std::sync::Arc;

use catalog_ports::ObjectStorePort;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::application::{ProductQueryService, UploadService};
use crate::domain::ProductRepository;

#[derive(Clone)]
pub struct AppState {
    pub uploads: Arc<UploadService>,
    pub queries: Arc<ProductQueryService>,
    /// multipart 文件的暂存目录
    pub upload_dir: Arc<PathBuf>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn ProductRepository>,
        store: Arc<dyn ObjectStorePort>,
        upload_dir: PathBuf,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            uploads: Arc::new(UploadService::new(store, repository.clone())),
            queries: Arc::new(ProductQueryService::new(repository)),
            upload_dir: Arc::new(upload_dir),
            metrics,
        }
    }
}
