//! HTTP handlers for product endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use shared::{Page, Product};

use super::ListParams;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::product::{CreateProductInput, ProductFilters, UpdateProductInput};
use crate::services::IndexedPage;
use crate::AppState;

/// List products
pub async fn list_products(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(params): Query<ListParams>,
    Query(filters): Query<ProductFilters>,
) -> AppResult<Json<Page<Product>>> {
    let page = state
        .products()
        .list_products(&current_user.0, filters, params.sort()?, params.page())
        .await?;
    Ok(Json(page))
}

/// Get one page of products by number
pub async fn get_product_page(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(index): Path<usize>,
    Query(params): Query<ListParams>,
    Query(filters): Query<ProductFilters>,
) -> AppResult<Json<IndexedPage<Product>>> {
    let page = state
        .products()
        .product_page(&current_user.0, filters, params.sort()?, params.limit, index)
        .await?;
    Ok(Json(page))
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateProductInput>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let product = state
        .products()
        .create_product(&current_user.0, input)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[derive(Serialize)]
pub struct NextSequenceResponse {
    pub sequence: u32,
}

/// Sequence the session's next SKU will carry, for client-side previews
pub async fn get_next_sku_sequence(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<NextSequenceResponse>> {
    let sequence = state.products().next_sku_sequence(&current_user.0)?;
    Ok(Json(NextSequenceResponse { sequence }))
}

/// Get a product
pub async fn get_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<String>,
) -> AppResult<Json<Product>> {
    let product = state
        .products()
        .get_product(&current_user.0, &product_id)
        .await?;
    Ok(Json(product))
}

/// Update a product
pub async fn update_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<String>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<Product>> {
    let product = state
        .products()
        .update_product(&current_user.0, &product_id, input)
        .await?;
    Ok(Json(product))
}

/// Soft delete a product
pub async fn delete_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<String>,
) -> AppResult<StatusCode> {
    state
        .products()
        .delete_product(&current_user.0, &product_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
