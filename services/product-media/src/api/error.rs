//! API 错误响应
//!
//! 4xx 返回错误消息原文；其余记录日志并返回各接口固定的提示文本

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catalog_errors::AppError;
use tracing::{error, warn};

pub const UPLOAD_FAILED: &str = "Error uploading image. Please try again.";
pub const LIST_IMAGES_FAILED: &str = "Error retrieving uploaded images. Please try again.";
pub const LIST_ALL_FAILED: &str = "Error retrieving all data. Please try again.";
pub const GET_FAILED: &str = "Error retrieving image. Please try again.";
pub const DELETE_FAILED: &str = "Error deleting image. Please try again.";

#[derive(Debug)]
pub struct ApiError {
    error: AppError,
    failure_message: &'static str,
}

impl ApiError {
    pub fn new(error: AppError, failure_message: &'static str) -> Self {
        Self {
            error,
            failure_message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.error.is_client_error() {
            let status = StatusCode::from_u16(self.error.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
            warn!(status = status.as_u16(), error = %self.error, "Request rejected");
            return (status, self.error.message().to_string()).into_response();
        }

        error!(error = %self.error, "{}", self.failure_message);
        (StatusCode::INTERNAL_SERVER_ERROR, self.failure_message).into_response()
    }
}

/// 给 `AppResult` 附加接口的失败提示
pub trait OrFailWith<T> {
    fn or_fail_with(self, failure_message: &'static str) -> Result<T, ApiError>;
}

impl<T> OrFailWith<T> for Result<T, AppError> {
    fn or_fail_with(self, failure_message: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::new(e, failure_message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: ApiError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_client_errors_keep_their_message() {
        let (status, body) = render(ApiError::new(AppError::not_found("Image not found."), GET_FAILED)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Image not found.");
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let (status, body) = render(ApiError::new(
            AppError::database("connection reset by peer"),
            LIST_ALL_FAILED,
        ))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, LIST_ALL_FAILED);

        // 上游 502 同样收敛为 500
        let (status, _) = render(ApiError::new(AppError::external_service("timeout"), UPLOAD_FAILED)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
