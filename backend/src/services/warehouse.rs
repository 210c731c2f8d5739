//! Warehouse management service

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::{
    validate_name, validate_warehouse_code, Filter, Page, PageRequest, Permission, Sort, Warehouse,
};

use crate::error::{AppError, AppResult};
use crate::models::Caller;
use crate::services::query_builder::ScopedQueryBuilder;
use crate::services::scoped::{to_document, IndexedPage, ScopedRepository};
use crate::store::DocumentStore;

/// Warehouse service for the caller's tenant
#[derive(Clone)]
pub struct WarehouseService {
    repo: ScopedRepository<Warehouse>,
}

/// Input for creating a warehouse
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWarehouseInput {
    pub name: String,
    pub code: String,
    pub address: Option<String>,
}

/// Input for updating a warehouse
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWarehouseInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

fn check_fields(name: Option<&str>, code: Option<&str>) -> AppResult<()> {
    if let Some(name) = name {
        validate_name(name).map_err(|msg| {
            AppError::validation("name", msg, "El nombre debe tener entre 1 y 120 caracteres")
        })?;
    }
    if let Some(code) = code {
        validate_warehouse_code(code).map_err(|msg| {
            AppError::validation(
                "code",
                msg,
                "El código debe tener 3 caracteres alfanuméricos en mayúsculas",
            )
        })?;
    }
    Ok(())
}

impl WarehouseService {
    /// Create a new WarehouseService instance
    pub fn new(store: Arc<dyn DocumentStore>, queries: ScopedQueryBuilder) -> Self {
        Self {
            repo: ScopedRepository::new(store, queries),
        }
    }

    fn filters(search: Option<&str>, code: Option<&str>) -> Vec<Filter> {
        let mut filters = Vec::new();
        if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
            filters.push(Filter::contains("name", search));
        }
        if let Some(code) = code {
            filters.push(Filter::eq("code", code.to_uppercase()));
        }
        filters
    }

    /// List active warehouses
    pub async fn list_warehouses(
        &self,
        caller: &Caller,
        search: Option<&str>,
        code: Option<&str>,
        sort: Option<Sort>,
        page: PageRequest,
    ) -> AppResult<Page<Warehouse>> {
        caller.require(Permission::ViewInventory)?;
        self.repo
            .list(caller, Self::filters(search, code), sort, page)
            .await
    }

    /// Jump to a page by number
    pub async fn warehouse_page(
        &self,
        caller: &Caller,
        search: Option<&str>,
        code: Option<&str>,
        sort: Option<Sort>,
        limit: Option<u32>,
        index: usize,
    ) -> AppResult<IndexedPage<Warehouse>> {
        caller.require(Permission::ViewInventory)?;
        self.repo
            .page_at(caller, Self::filters(search, code), sort, limit, index)
            .await
    }

    pub async fn get_warehouse(&self, caller: &Caller, id: &str) -> AppResult<Warehouse> {
        caller.require(Permission::ViewInventory)?;
        self.repo.get(caller, id).await
    }

    pub async fn create_warehouse(
        &self,
        caller: &Caller,
        input: CreateWarehouseInput,
    ) -> AppResult<Warehouse> {
        caller.require(Permission::ManageWarehouses)?;
        check_fields(Some(&input.name), Some(&input.code))?;

        let input = CreateWarehouseInput {
            name: input.name.trim().to_string(),
            ..input
        };
        self.repo.create(caller, to_document(&input)?).await
    }

    pub async fn update_warehouse(
        &self,
        caller: &Caller,
        id: &str,
        input: UpdateWarehouseInput,
    ) -> AppResult<Warehouse> {
        caller.require(Permission::ManageWarehouses)?;
        check_fields(input.name.as_deref(), input.code.as_deref())?;
        self.repo.update(caller, id, to_document(&input)?).await
    }

    /// Soft delete a warehouse
    pub async fn delete_warehouse(&self, caller: &Caller, id: &str) -> AppResult<()> {
        caller.require(Permission::ManageWarehouses)?;
        self.repo.deactivate(caller, id).await
    }
}
