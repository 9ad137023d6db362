//! product-media 服务入口

use std::sync::Arc;

use catalog_bootstrap::{Infrastructure, run_http};
use product_media::api::{AppState, router};
use product_media::infrastructure::persistence::PostgresProductRepository;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run_http("config", |infra: Infrastructure| async move {
        let repository = Arc::new(PostgresProductRepository::new(infra.postgres_pool()));
        repository.ensure_schema().await?;
        info!("Product repository initialized");

        let state = AppState::new(
            repository,
            infra.object_store(),
            infra.upload_dir().to_path_buf(),
            infra.metrics(),
        );

        Ok(router(state, &infra.config().server))
    })
    .await
}
