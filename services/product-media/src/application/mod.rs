//! 应用层

pub mod queries;
pub mod staging;
pub mod upload;

pub use queries::ProductQueryService;
pub use staging::StagedFile;
pub use upload::{UploadProduct, UploadService};
