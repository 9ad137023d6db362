//! 运维接口

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catalog_telemetry::HealthStatus;
use serde::Serialize;

use super::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// 数据库不可用时返回 503
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let mut status = HealthStatus::new();
    match state.queries.ping().await {
        Ok(()) => status.add_check("database", true, None),
        Err(e) => status.add_check("database", false, Some(e.message().to_string())),
    }

    let code = if status.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}
