//! 商品仓储接口

use async_trait::async_trait;
use catalog_common::ProductId;
use catalog_errors::AppResult;

use super::product::{NewProduct, Product};

/// 商品仓储接口
///
/// 列表顺序与插入顺序一致
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// 插入新商品，由仓储分配 ID
    async fn insert(&self, product: NewProduct) -> AppResult<Product>;

    /// 按插入顺序返回全部商品
    async fn find_all(&self) -> AppResult<Vec<Product>>;

    async fn find_by_id(&self, id: &ProductId) -> AppResult<Option<Product>>;

    /// 删除并返回被删除的商品
    async fn delete_by_id(&self, id: &ProductId) -> AppResult<Option<Product>>;

    /// 存储连通性检查
    async fn ping(&self) -> AppResult<()>;
}
