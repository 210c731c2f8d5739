//! HTTP handlers for warehouse endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{Page, Warehouse};

use super::ListParams;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::warehouse::{CreateWarehouseInput, UpdateWarehouseInput};
use crate::services::IndexedPage;
use crate::AppState;

/// Warehouse-specific listing filters
#[derive(Debug, Default, Deserialize)]
pub struct WarehouseQuery {
    pub code: Option<String>,
}

/// List warehouses
pub async fn list_warehouses(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<WarehouseQuery>,
) -> AppResult<Json<Page<Warehouse>>> {
    let page = state
        .warehouses()
        .list_warehouses(
            &current_user.0,
            params.search.as_deref(),
            filter.code.as_deref(),
            params.sort()?,
            params.page(),
        )
        .await?;
    Ok(Json(page))
}

/// Get one page of warehouses by number
pub async fn get_warehouse_page(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(index): Path<usize>,
    Query(params): Query<ListParams>,
    Query(filter): Query<WarehouseQuery>,
) -> AppResult<Json<IndexedPage<Warehouse>>> {
    let page = state
        .warehouses()
        .warehouse_page(
            &current_user.0,
            params.search.as_deref(),
            filter.code.as_deref(),
            params.sort()?,
            params.limit,
            index,
        )
        .await?;
    Ok(Json(page))
}

/// Create a warehouse
pub async fn create_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateWarehouseInput>,
) -> AppResult<(StatusCode, Json<Warehouse>)> {
    let warehouse = state
        .warehouses()
        .create_warehouse(&current_user.0, input)
        .await?;
    Ok((StatusCode::CREATED, Json(warehouse)))
}

/// Get a warehouse
pub async fn get_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<String>,
) -> AppResult<Json<Warehouse>> {
    let warehouse = state
        .warehouses()
        .get_warehouse(&current_user.0, &warehouse_id)
        .await?;
    Ok(Json(warehouse))
}

/// Update a warehouse
pub async fn update_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<String>,
    Json(input): Json<UpdateWarehouseInput>,
) -> AppResult<Json<Warehouse>> {
    let warehouse = state
        .warehouses()
        .update_warehouse(&current_user.0, &warehouse_id, input)
        .await?;
    Ok(Json(warehouse))
}

/// Soft delete a warehouse
pub async fn delete_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<String>,
) -> AppResult<StatusCode> {
    state
        .warehouses()
        .delete_warehouse(&current_user.0, &warehouse_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
