//! 路由装配

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{delete, get, post};
use catalog_config::ServerConfig;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::handlers::{delete_product, get_product, list_image_urls, list_products, upload_product};
use super::health::{health, metrics, ready};
use super::state::AppState;

pub fn router(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/upload", post(upload_product))
        .route("/images", get(list_image_urls))
        .route("/all", get(list_products))
        .route("/all/{id}", get(get_product))
        .route("/delete/{id}", delete(delete_product))
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/metrics", get(metrics))
        .layer(DefaultBodyLimit::max(server.body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&server.cors_allowed_origins))
        .with_state(state)
}

/// 未配置来源时允许任意来源
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
