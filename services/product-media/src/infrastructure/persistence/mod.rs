//! 商品仓储实现

mod memory;
mod postgres;
mod rows;

pub use memory::InMemoryProductRepository;
pub use postgres::PostgresProductRepository;
