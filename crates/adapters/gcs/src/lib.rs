//! catalog-adapter-gcs - Google Cloud Storage 适配器
//!
//! 通过 JSON API 上传对象，使用服务账号 JWT 换取 OAuth2 访问令牌。

mod client;
mod config;
mod error;
mod token;

pub use client::*;
pub use config::*;
pub use error::*;
pub use token::*;
