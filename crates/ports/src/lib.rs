//! ports - 抽象 trait 层
//!
//! 定义服务依赖的外部基础设施接口

mod object_store;

pub use object_store::*;
