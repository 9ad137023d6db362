//! 数据库行映射

use catalog_common::ProductId;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

use crate::domain::{DetailImage, Product};

/// products 表的一行
#[derive(Debug, FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub image_url: String,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub sold: Option<i64>,
    pub stock: Option<i64>,
    pub product_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub detail_images: Json<Vec<DetailImage>>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::from_uuid(row.id),
            image_url: row.image_url,
            name: row.name,
            price: row.price,
            description: row.description,
            rating: row.rating,
            category: row.category,
            location: row.location,
            sold: row.sold,
            stock: row.stock,
            product_type: row.product_type,
            created_at: row.created_at,
            detail_images: row.detail_images.0,
        }
    }
}
