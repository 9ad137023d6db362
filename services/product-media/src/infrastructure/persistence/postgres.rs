//! PostgreSQL 商品仓储

use async_trait::async_trait;
use catalog_adapter_postgres::{PoolStatus, check_connection};
use catalog_common::{ProductId, new_id};
use catalog_errors::{AppError, AppResult};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::{debug, info};

use super::rows::ProductRow;
use crate::domain::{NewProduct, Product, ProductRepository};

const CREATE_PRODUCTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    seq BIGSERIAL NOT NULL,
    id UUID PRIMARY KEY,
    image_url TEXT NOT NULL,
    name TEXT,
    price DOUBLE PRECISION,
    description TEXT,
    rating DOUBLE PRECISION,
    category TEXT,
    location TEXT,
    sold BIGINT,
    stock BIGINT,
    product_type TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    detail_images JSONB NOT NULL DEFAULT '[]'::jsonb
)
"#;

const PRODUCT_COLUMNS: &str = "id, image_url, name, price, description, rating, category, location, \
     sold, stock, product_type, created_at, detail_images";

fn record(operation: &'static str, success: bool) {
    metrics::counter!(
        "product_repository_ops_total",
        "operation" => operation,
        "success" => if success { "true" } else { "false" }
    )
    .increment(1);
}

fn observe<T>(operation: &'static str, result: Result<T, sqlx::Error>) -> AppResult<T> {
    record(operation, result.is_ok());
    result.map_err(|e| AppError::database(format!("Product {} failed: {}", operation, e)))
}

pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 确保 products 表存在（幂等）
    pub async fn ensure_schema(&self) -> AppResult<()> {
        sqlx::query(CREATE_PRODUCTS_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create products table: {}", e)))?;
        info!("products table ready");
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn insert(&self, product: NewProduct) -> AppResult<Product> {
        let sql = format!(
            r#"
            INSERT INTO products (
                id, image_url, name, price, description, rating, category, location,
                sold, stock, product_type, created_at, detail_images
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );

        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(new_id())
            .bind(&product.image_url)
            .bind(&product.name)
            .bind(product.price)
            .bind(&product.description)
            .bind(product.rating)
            .bind(&product.category)
            .bind(&product.location)
            .bind(product.sold)
            .bind(product.stock)
            .bind(&product.product_type)
            .bind(product.created_at)
            .bind(Json(&product.detail_images))
            .fetch_one(&self.pool)
            .await;

        observe("insert", row).map(Product::from)
    }

    async fn find_all(&self) -> AppResult<Vec<Product>> {
        let sql = format!("SELECT {} FROM products ORDER BY seq", PRODUCT_COLUMNS);
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(&self.pool)
            .await;

        Ok(observe("find_all", rows)?.into_iter().map(Product::from).collect())
    }

    async fn find_by_id(&self, id: &ProductId) -> AppResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await;

        Ok(observe("find_by_id", row)?.map(Product::from))
    }

    async fn delete_by_id(&self, id: &ProductId) -> AppResult<Option<Product>> {
        let sql = format!("DELETE FROM products WHERE id = $1 RETURNING {}", PRODUCT_COLUMNS);
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await;

        Ok(observe("delete_by_id", row)?.map(Product::from))
    }

    async fn ping(&self) -> AppResult<()> {
        let latency = check_connection(&self.pool).await?;
        let status = PoolStatus::of(&self.pool);
        debug!(
            latency_ms = latency.as_millis() as u64,
            pool_size = status.size,
            active = status.active(),
            "Database ping"
        );
        Ok(())
    }
}
