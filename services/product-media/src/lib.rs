//! product-media 服务库
//!
//! 商品图片上传到对象存储，商品元数据写入 PostgreSQL

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
