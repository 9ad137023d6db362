//! 路由测试公共设施

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use catalog_config::ServerConfig;
use catalog_errors::{AppError, AppResult};
use catalog_common::ProductId;
use catalog_ports::{ObjectStorePort, StoredObject, UploadOptions};
use product_media::api::{AppState, router};
use product_media::domain::{NewProduct, Product, ProductRepository};
use product_media::infrastructure::persistence::InMemoryProductRepository;
use tempfile::TempDir;
use tokio::sync::Mutex;

/// 已上传的对象
#[derive(Debug, Clone)]
pub struct FakeObject {
    pub destination: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// 内存对象存储
#[derive(Default)]
pub struct FakeObjectStore {
    pub objects: Mutex<Vec<FakeObject>>,
    /// 上传到该目标名时失败
    pub fail_on: Option<String>,
}

impl FakeObjectStore {
    pub fn failing_on(destination: &str) -> Self {
        Self {
            fail_on: Some(destination.to_string()),
            ..Default::default()
        }
    }

    pub fn media_link(destination: &str) -> String {
        format!("https://storage.test/toko-images/{}", destination)
    }
}

#[async_trait]
impl ObjectStorePort for FakeObjectStore {
    async fn upload_file(&self, local_path: &Path, options: &UploadOptions) -> AppResult<StoredObject> {
        if self.fail_on.as_deref() == Some(options.destination.as_str()) {
            return Err(AppError::storage("simulated outage"));
        }
        let body = tokio::fs::read(local_path).await?;

        self.objects.lock().await.push(FakeObject {
            destination: options.destination.clone(),
            content_type: options.content_type.clone(),
            body,
        });

        Ok(StoredObject {
            name: options.destination.clone(),
            media_link: Self::media_link(&options.destination),
        })
    }
}

/// 所有操作都失败的仓储
pub struct FailingProductRepository;

impl FailingProductRepository {
    fn outage() -> AppError {
        AppError::database("connection refused")
    }
}

#[async_trait]
impl ProductRepository for FailingProductRepository {
    async fn insert(&self, _product: NewProduct) -> AppResult<Product> {
        Err(Self::outage())
    }

    async fn find_all(&self) -> AppResult<Vec<Product>> {
        Err(Self::outage())
    }

    async fn find_by_id(&self, _id: &ProductId) -> AppResult<Option<Product>> {
        Err(Self::outage())
    }

    async fn delete_by_id(&self, _id: &ProductId) -> AppResult<Option<Product>> {
        Err(Self::outage())
    }

    async fn ping(&self) -> AppResult<()> {
        Err(Self::outage())
    }
}

pub struct TestApp {
    pub router: Router,
    pub repository: Arc<dyn ProductRepository>,
    pub store: Arc<FakeObjectStore>,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(FakeObjectStore::default())
    }

    pub fn with_store(store: FakeObjectStore) -> Self {
        Self::build(store, ServerConfig::default())
    }

    pub fn build(store: FakeObjectStore, server: ServerConfig) -> Self {
        Self::assemble(Arc::new(InMemoryProductRepository::new()), store, server)
    }

    pub fn with_failing_repository() -> Self {
        Self::assemble(
            Arc::new(FailingProductRepository),
            FakeObjectStore::default(),
            ServerConfig::default(),
        )
    }

    fn assemble(repository: Arc<dyn ProductRepository>, store: FakeObjectStore, server: ServerConfig) -> Self {
        let upload_dir = tempfile::tempdir().unwrap();
        let store = Arc::new(store);

        let state = AppState::new(
            repository.clone(),
            store.clone(),
            upload_dir.path().to_path_buf(),
            None,
        );

        Self {
            router: router(state, &server),
            repository,
            store,
            upload_dir,
        }
    }

    /// 暂存目录中剩余的文件数
    pub fn staged_file_count(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path()).unwrap().count()
    }

    pub async fn uploaded_count(&self) -> usize {
        self.store.objects.lock().await.len()
    }
}

/// 手工拼装 multipart/form-data 请求体
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: "----product-media-test-boundary".to_string(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, contents: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(contents);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, uri: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", self.boundary),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn read_text(response: Response<Body>) -> (StatusCode, String) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

pub async fn read_json(response: Response<Body>) -> (StatusCode, serde_json::Value) {
    let (status, text) = read_text(response).await;
    (status, serde_json::from_str(&text).unwrap())
}
