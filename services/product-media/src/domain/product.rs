//! 商品记录
//!
//! JSON 字段名与旧版客户端保持一致（`_id`、`nama_product`、`harga` ...）

use std::collections::HashMap;

use catalog_common::ProductId;
use catalog_errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 详情图
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailImage {
    pub image: String,
}

impl DetailImage {
    pub fn new(image: impl Into<String>) -> Self {
        Self { image: image.into() }
    }
}

/// 详情图数量上限
pub const MAX_DETAIL_IMAGES: usize = 5;

/// 表单文本字段名
pub mod fields {
    pub const NAME: &str = "nama_product";
    pub const PRICE: &str = "harga";
    pub const DESCRIPTION: &str = "deskripsi";
    pub const RATING: &str = "rate";
    pub const CATEGORY: &str = "category";
    pub const LOCATION: &str = "lokasi";
    pub const SOLD: &str = "terjual";
    pub const STOCK: &str = "stok";
    pub const TYPE: &str = "type";
    pub const CREATED_AT: &str = "createdat";
}

/// 上传表单中的商品属性
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductAttributes {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub sold: Option<i64>,
    pub stock: Option<i64>,
    pub product_type: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl ProductAttributes {
    /// 从 multipart 文本字段解析
    ///
    /// 未知字段被忽略；数值或时间无法解析时返回校验错误
    pub fn from_fields(values: &HashMap<String, String>) -> AppResult<Self> {
        let text = |key: &str| values.get(key).cloned();

        Ok(Self {
            name: text(fields::NAME),
            price: parse_decimal(fields::PRICE, values.get(fields::PRICE))?,
            description: text(fields::DESCRIPTION),
            rating: parse_decimal(fields::RATING, values.get(fields::RATING))?,
            category: text(fields::CATEGORY),
            location: text(fields::LOCATION),
            sold: parse_integer(fields::SOLD, values.get(fields::SOLD))?,
            stock: parse_integer(fields::STOCK, values.get(fields::STOCK))?,
            product_type: text(fields::TYPE),
            created_at: values
                .get(fields::CREATED_AT)
                .map(|v| parse_created_at(v))
                .transpose()?
                .flatten(),
        })
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn parse_decimal(field: &str, value: Option<&String>) -> AppResult<Option<f64>> {
    let Some(raw) = non_blank(value) else {
        return Ok(None);
    };
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(Some(n)),
        _ => Err(AppError::validation(format!(
            "Invalid number for {}: {}",
            field, raw
        ))),
    }
}

fn parse_integer(field: &str, value: Option<&String>) -> AppResult<Option<i64>> {
    let Some(raw) = non_blank(value) else {
        return Ok(None);
    };
    raw.parse::<i64>()
        .map(Some)
        .map_err(|_| AppError::validation(format!("Invalid integer for {}: {}", field, raw)))
}

/// 解析 `createdat`：RFC 3339、`YYYY-MM-DD`、`YYYY`（UTC 零点）或毫秒时间戳
pub fn parse_created_at(raw: &str) -> AppResult<Option<DateTime<Utc>>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Some(midnight.and_utc()));
        }
    }
    // 不超过四位的纯数字按年份处理，更长的按毫秒时间戳
    if raw.len() <= 4 && raw.bytes().all(|b| b.is_ascii_digit()) {
        if let Some(midnight) = raw
            .parse::<i32>()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
            .and_then(|date| date.and_hms_opt(0, 0, 0))
        {
            return Ok(Some(midnight.and_utc()));
        }
    } else if let Ok(millis) = raw.parse::<i64>() {
        if let Some(ts) = DateTime::from_timestamp_millis(millis) {
            return Ok(Some(ts));
        }
    }

    Err(AppError::validation(format!(
        "Invalid timestamp for {}: {}",
        fields::CREATED_AT,
        raw
    )))
}

/// 待插入的商品
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
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
    pub detail_images: Vec<DetailImage>,
}

impl NewProduct {
    /// 未提供 `createdat` 时取当前时间
    pub fn new(image_url: impl Into<String>, attrs: ProductAttributes, detail_images: Vec<DetailImage>) -> Self {
        Self {
            image_url: image_url.into(),
            name: attrs.name,
            price: attrs.price,
            description: attrs.description,
            rating: attrs.rating,
            category: attrs.category,
            location: attrs.location,
            sold: attrs.sold,
            stock: attrs.stock,
            product_type: attrs.product_type,
            created_at: attrs.created_at.unwrap_or_else(Utc::now),
            detail_images,
        }
    }

    pub fn with_id(self, id: ProductId) -> Product {
        Product {
            id,
            image_url: self.image_url,
            name: self.name,
            price: self.price,
            description: self.description,
            rating: self.rating,
            category: self.category,
            location: self.location,
            sold: self.sold,
            stock: self.stock,
            product_type: self.product_type,
            created_at: self.created_at,
            detail_images: self.detail_images,
        }
    }
}

/// 商品记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(rename = "nama_product")]
    pub name: Option<String>,
    #[serde(rename = "harga")]
    pub price: Option<f64>,
    #[serde(rename = "deskripsi")]
    pub description: Option<String>,
    #[serde(rename = "rate")]
    pub rating: Option<f64>,
    pub category: Option<String>,
    #[serde(rename = "lokasi")]
    pub location: Option<String>,
    #[serde(rename = "terjual")]
    pub sold: Option<i64>,
    #[serde(rename = "stok")]
    pub stock: Option<i64>,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    #[serde(rename = "createdat")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "detailproduct")]
    pub detail_images: Vec<DetailImage>,
}
