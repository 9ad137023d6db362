//! 商品查询与删除

use std::sync::Arc;

use catalog_common::ProductId;
use catalog_errors::{AppError, AppResult};
use tracing::info;

use crate::domain::{Product, ProductRepository};

pub const NOT_FOUND_MESSAGE: &str = "Image not found.";

/// 查询服务
pub struct ProductQueryService {
    repository: Arc<dyn ProductRepository>,
}

impl ProductQueryService {
    pub fn new(repository: Arc<dyn ProductRepository>) -> Self {
        Self { repository }
    }

    /// 全部主图地址，顺序与 [`Self::list_products`] 一致
    pub async fn list_image_urls(&self) -> AppResult<Vec<String>> {
        let products = self.repository.find_all().await?;
        Ok(products.into_iter().map(|p| p.image_url).collect())
    }

    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        self.repository.find_all().await
    }

    pub async fn get_product(&self, raw_id: &str) -> AppResult<Product> {
        let id = parse_id(raw_id)?;
        self.repository
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::not_found(NOT_FOUND_MESSAGE))
    }

    pub async fn delete_product(&self, raw_id: &str) -> AppResult<Product> {
        let id = parse_id(raw_id)?;
        let deleted = self
            .repository
            .delete_by_id(&id)
            .await?
            .ok_or_else(|| AppError::not_found(NOT_FOUND_MESSAGE))?;

        info!(product_id = %deleted.id, "Product deleted");
        Ok(deleted)
    }

    /// 仓储连通性
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}

// 格式错误的 ID 走服务端错误分支
fn parse_id(raw: &str) -> AppResult<ProductId> {
    ProductId::parse(raw).map_err(|e| AppError::internal(format!("Malformed product id {:?}: {}", raw, e)))
}
