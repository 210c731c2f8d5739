//! HTTP handlers for the business directory

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use shared::{Business, Page};

use super::ListParams;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::business::CreateBusinessInput;
use crate::AppState;

/// List businesses a privileged caller can select
pub async fn list_businesses(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Page<Business>>> {
    let page = state
        .businesses()
        .list_businesses(&current_user.0, params.page())
        .await?;
    Ok(Json(page))
}

/// Register a business
pub async fn create_business(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateBusinessInput>,
) -> AppResult<(StatusCode, Json<Business>)> {
    let business = state
        .businesses()
        .create_business(&current_user.0, input)
        .await?;
    Ok((StatusCode::CREATED, Json(business)))
}
