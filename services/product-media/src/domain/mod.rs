//! 领域层
//!
//! 商品记录、表单属性解析与仓储接口

pub mod product;
pub mod repositories;

pub use product::*;
pub use repositories::*;
