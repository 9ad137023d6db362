//! 内存仓储，用于本地调试与测试

use async_trait::async_trait;
use catalog_common::ProductId;
use catalog_errors::AppResult;
use tokio::sync::RwLock;

use crate::domain::{NewProduct, Product, ProductRepository};

#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    products: RwLock<Vec<Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn insert(&self, product: NewProduct) -> AppResult<Product> {
        let product = product.with_id(ProductId::new());
        self.products.write().await.push(product.clone());
        Ok(product)
    }

    async fn find_all(&self) -> AppResult<Vec<Product>> {
        Ok(self.products.read().await.clone())
    }

    async fn find_by_id(&self, id: &ProductId) -> AppResult<Option<Product>> {
        Ok(self.products.read().await.iter().find(|p| &p.id == id).cloned())
    }

    async fn delete_by_id(&self, id: &ProductId) -> AppResult<Option<Product>> {
        let mut products = self.products.write().await;
        Ok(products
            .iter()
            .position(|p| &p.id == id)
            .map(|idx| products.remove(idx)))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
