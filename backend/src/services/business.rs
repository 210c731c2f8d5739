//! Business directory service
//!
//! Businesses are the tenants themselves, so this collection is not tenant
//! scoped. Only callers holding `manage_businesses` can browse it.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use shared::{
    validate_name, validate_tenant_id, Business, Filter, Page, PageRequest, Permission, Sort,
    TenantId, BUSINESS_COLLECTION, ID_FIELD,
};

use crate::config::PaginationConfig;
use crate::error::{AppError, AppResult};
use crate::models::Caller;
use crate::services::scoped::to_document;
use crate::store::{DocumentStore, StoreError};

#[derive(Clone)]
pub struct BusinessService {
    store: Arc<dyn DocumentStore>,
    pagination: PaginationConfig,
}

/// Input for registering a business
#[derive(Debug, Deserialize)]
pub struct CreateBusinessInput {
    pub id: String,
    pub name: String,
}

fn decode(document: crate::store::Document) -> AppResult<Business> {
    serde_json::from_value(serde_json::Value::Object(document))
        .map_err(|e| AppError::QueryFailed(StoreError::Serialization(e)))
}

impl BusinessService {
    pub fn new(store: Arc<dyn DocumentStore>, pagination: PaginationConfig) -> Self {
        Self { store, pagination }
    }

    /// Active businesses by name
    pub async fn list_businesses(
        &self,
        caller: &Caller,
        page: PageRequest,
    ) -> AppResult<Page<Business>> {
        caller.require(Permission::ManageBusinesses)?;
        let limit = page
            .limit
            .unwrap_or(self.pagination.default_page_size)
            .clamp(1, self.pagination.max_page_size);

        let page = self
            .store
            .query(
                BUSINESS_COLLECTION,
                &[Filter::active()],
                &Sort::asc("name"),
                page.cursor.as_ref(),
                limit,
            )
            .await
            .map_err(AppError::from)?;
        page.try_map(decode)
    }

    /// Whether an active business with this id exists
    pub async fn exists(&self, tenant_id: &TenantId) -> AppResult<bool> {
        let page = self
            .store
            .query(
                BUSINESS_COLLECTION,
                &[Filter::eq(ID_FIELD, tenant_id.as_str()), Filter::active()],
                &Sort::asc(ID_FIELD),
                None,
                1,
            )
            .await
            .map_err(AppError::QueryFailed)?;
        Ok(!page.items.is_empty())
    }

    pub async fn create_business(
        &self,
        caller: &Caller,
        input: CreateBusinessInput,
    ) -> AppResult<Business> {
        caller.require(Permission::ManageBusinesses)?;
        validate_tenant_id(&input.id)
            .map_err(|msg| AppError::validation("id", msg, "Identificador de negocio inválido"))?;
        validate_name(&input.name).map_err(|msg| {
            AppError::validation("name", msg, "El nombre debe tener entre 1 y 120 caracteres")
        })?;

        let now = Utc::now();
        let business = Business {
            id: TenantId::new(input.id),
            name: input.name.trim().to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        match self
            .store
            .insert(BUSINESS_COLLECTION, to_document(&business)?)
            .await
        {
            Ok(_) => {}
            Err(StoreError::Duplicate { .. }) => {
                return Err(AppError::Conflict {
                    resource: "id".to_string(),
                    message: format!("Business {} already exists", business.id),
                    message_es: format!("El negocio {} ya existe", business.id),
                })
            }
            Err(e) => return Err(AppError::QueryFailed(e)),
        }

        tracing::info!(tenant_id = %business.id, "Business registered");
        Ok(business)
    }
}
