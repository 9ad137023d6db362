//! 商品接口

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use catalog_errors::AppError;

use super::error::{
    ApiError, DELETE_FAILED, GET_FAILED, LIST_ALL_FAILED, LIST_IMAGES_FAILED, OrFailWith, UPLOAD_FAILED,
};
use super::multipart::read_upload_form;
use super::state::AppState;
use crate::application::upload::NO_IMAGE_MESSAGE;
use crate::domain::Product;

pub const DELETED_MESSAGE: &str = "Product deleted successfully.";

/// POST /upload
///
/// 成功时返回主图的公开地址（纯文本）
pub async fn upload_product(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<String, ApiError> {
    // 非 multipart 请求视为没有上传文件
    let mut multipart =
        multipart.map_err(|_| ApiError::new(AppError::validation(NO_IMAGE_MESSAGE), UPLOAD_FAILED))?;

    let command = read_upload_form(&mut multipart, &state.upload_dir)
        .await
        .or_fail_with(UPLOAD_FAILED)?;
    let product = state.uploads.upload(command).await.or_fail_with(UPLOAD_FAILED)?;

    Ok(product.image_url)
}

/// GET /images
pub async fn list_image_urls(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let urls = state.queries.list_image_urls().await.or_fail_with(LIST_IMAGES_FAILED)?;
    Ok(Json(urls))
}

/// GET /all
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.queries.list_products().await.or_fail_with(LIST_ALL_FAILED)?;
    Ok(Json(products))
}

/// GET /all/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = state.queries.get_product(&id).await.or_fail_with(GET_FAILED)?;
    Ok(Json(product))
}

/// DELETE /delete/{id}
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<&'static str, ApiError> {
    state.queries.delete_product(&id).await.or_fail_with(DELETE_FAILED)?;
    Ok(DELETED_MESSAGE)
}
