//! GCS 错误映射

use catalog_errors::AppError;
use reqwest::StatusCode;

/// 将 reqwest 传输错误转换为 AppError
pub fn map_transport_error(err: reqwest::Error, context: &str) -> AppError {
    if err.is_timeout() || err.is_connect() {
        AppError::external_service(format!("{}: {}", context, err))
    } else {
        AppError::storage(format!("{}: {}", context, err))
    }
}

/// 将非 2xx 响应转换为 AppError
pub fn map_status_error(status: StatusCode, body: &str, context: &str) -> AppError {
    let body = body.trim();
    match status {
        // 桶不存在属于部署问题，不能作为 404 透传给调用方
        StatusCode::NOT_FOUND => AppError::storage(format!("{}: bucket not found: {}", context, body)),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AppError::storage(format!("{}: access denied ({}): {}", context, status, body))
        }
        s if s.is_server_error() => {
            AppError::external_service(format!("{}: {}: {}", context, status, body))
        }
        _ => AppError::storage(format!("{}: {}: {}", context, status, body)),
    }
}
