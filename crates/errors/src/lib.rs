//! catalog-errors - 统一错误处理

use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn payload_too_large(msg: impl Into<String>) -> Self {
        Self::PayloadTooLarge(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn external_service(msg: impl Into<String>) -> Self {
        Self::ExternalService(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// 不带类别前缀的原始消息
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(m)
            | Self::Validation(m)
            | Self::PayloadTooLarge(m)
            | Self::Internal(m)
            | Self::Database(m)
            | Self::Storage(m)
            | Self::ExternalService(m)
            | Self::Config(m) => m,
        }
    }

    /// 是否为客户端错误（4xx）
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// 转换为 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::PayloadTooLarge(_) => 413,
            Self::Internal(_) => 500,
            Self::Database(_) => 500,
            Self::Storage(_) => 500,
            Self::ExternalService(_) => 502,
            Self::Config(_) => 500,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(format!("I/O error: {}", err))
    }
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::not_found("x").status_code(), 404);
        assert_eq!(AppError::validation("x").status_code(), 400);
        assert_eq!(AppError::payload_too_large("x").status_code(), 413);
        assert_eq!(AppError::database("x").status_code(), 500);
        assert_eq!(AppError::storage("x").status_code(), 500);
        assert_eq!(AppError::external_service("x").status_code(), 502);
    }

    #[test]
    fn test_message_strips_prefix() {
        let err = AppError::not_found("Image not found.");
        assert_eq!(err.to_string(), "Not found: Image not found.");
        assert_eq!(err.message(), "Image not found.");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(AppError::validation("bad").is_client_error());
        assert!(AppError::not_found("gone").is_client_error());
        assert!(AppError::payload_too_large("big").is_client_error());
        assert!(!AppError::internal("boom").is_client_error());
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Internal(_)));
        assert!(err.message().contains("missing"));
    }
}
