//! HTTP 接口层

mod error;
mod handlers;
mod health;
mod multipart;
mod routes;
mod state;

pub use error::ApiError;
pub use multipart::read_upload_form;
pub use routes::router;
pub use state::AppState;
