//! HTTP handlers for category endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{Category, Page};

use super::ListParams;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::category::{CreateCategoryInput, UpdateCategoryInput};
use crate::services::IndexedPage;
use crate::AppState;

/// List categories
pub async fn list_categories(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Page<Category>>> {
    let page = state
        .categories()
        .list_categories(
            &current_user.0,
            params.search.as_deref(),
            params.sort()?,
            params.page(),
        )
        .await?;
    Ok(Json(page))
}

/// Get one page of categories by number
pub async fn get_category_page(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(index): Path<usize>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<IndexedPage<Category>>> {
    let page = state
        .categories()
        .category_page(
            &current_user.0,
            params.search.as_deref(),
            params.sort()?,
            params.limit,
            index,
        )
        .await?;
    Ok(Json(page))
}

/// Create a category
pub async fn create_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateCategoryInput>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let category = state
        .categories()
        .create_category(&current_user.0, input)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Get a category
pub async fn get_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<String>,
) -> AppResult<Json<Category>> {
    let category = state
        .categories()
        .get_category(&current_user.0, &category_id)
        .await?;
    Ok(Json(category))
}

/// Update a category
pub async fn update_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<String>,
    Json(input): Json<UpdateCategoryInput>,
) -> AppResult<Json<Category>> {
    let category = state
        .categories()
        .update_category(&current_user.0, &category_id, input)
        .await?;
    Ok(Json(category))
}

/// Soft delete a category
pub async fn delete_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<String>,
) -> AppResult<StatusCode> {
    state
        .categories()
        .delete_category(&current_user.0, &category_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
