//! HTTP handlers for the privileged tenant selection

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use shared::{EffectiveTenant, TenantId, TenantSelection};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::AppState;

/// Current selection state of the session
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionView {
    pub selection: Option<TenantSelection>,
    pub valid: bool,
    pub effective: Option<EffectiveTenant>,
}

/// Input for choosing a tenant
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSelectionInput {
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub show_all: bool,
}

/// Get the session's selection and what it resolves to
pub async fn get_selection(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<SelectionView>> {
    let caller = &current_user.0;
    let selection = state.tenants.current_selection(caller)?;
    let valid = state.tenants.is_selection_valid(caller)?;
    let effective = match state.tenants.resolve_effective_tenant(caller) {
        Ok(effective) => Some(effective),
        Err(AppError::TenantSelectionRequired | AppError::NoTenantContext) => None,
        Err(e) => return Err(e),
    };

    Ok(Json(SelectionView {
        selection,
        valid,
        effective,
    }))
}

/// Choose one business or all businesses
pub async fn set_selection(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<SetSelectionInput>,
) -> AppResult<Json<SelectionView>> {
    let caller = &current_user.0;
    let tenant_id = input
        .tenant_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .map(TenantId::new);

    if caller.is_privileged() {
        if let Some(tenant_id) = &tenant_id {
            if !state.businesses().exists(tenant_id).await? {
                return Err(AppError::NotFound("Business".to_string()));
            }
        }
    }

    state
        .tenants
        .set_selection(caller, tenant_id, input.show_all)?;

    get_selection(State(state), current_user).await
}

/// Reset the selection (logout)
pub async fn clear_selection(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<StatusCode> {
    state.tenants.clear_selection(&current_user.0)?;
    state.skus.end_session(&current_user.0)?;
    Ok(StatusCode::NO_CONTENT)
}
