//! Category management service

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::{validate_name, Category, Filter, Page, PageRequest, Permission, Sort};

use crate::error::{AppError, AppResult};
use crate::models::Caller;
use crate::services::query_builder::ScopedQueryBuilder;
use crate::services::scoped::{to_document, IndexedPage, ScopedRepository};
use crate::store::DocumentStore;

/// Category service for the caller's tenant
#[derive(Clone)]
pub struct CategoryService {
    repo: ScopedRepository<Category>,
}

/// Input for creating a category
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryInput {
    pub name: String,
    pub description: Option<String>,
}

/// Input for updating a category
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Rejected when it differs from the current owner
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

fn check_name(name: &str) -> AppResult<()> {
    validate_name(name).map_err(|msg| {
        AppError::validation("name", msg, "El nombre debe tener entre 1 y 120 caracteres")
    })
}

fn name_filters(search: Option<&str>) -> Vec<Filter> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| vec![Filter::contains("name", s)])
        .unwrap_or_default()
}

impl CategoryService {
    /// Create a new CategoryService instance
    pub fn new(store: Arc<dyn DocumentStore>, queries: ScopedQueryBuilder) -> Self {
        Self {
            repo: ScopedRepository::new(store, queries),
        }
    }

    /// List active categories, optionally filtered by name
    pub async fn list_categories(
        &self,
        caller: &Caller,
        search: Option<&str>,
        sort: Option<Sort>,
        page: PageRequest,
    ) -> AppResult<Page<Category>> {
        caller.require(Permission::ViewInventory)?;
        self.repo.list(caller, name_filters(search), sort, page).await
    }

    /// Jump to a page by number
    pub async fn category_page(
        &self,
        caller: &Caller,
        search: Option<&str>,
        sort: Option<Sort>,
        limit: Option<u32>,
        index: usize,
    ) -> AppResult<IndexedPage<Category>> {
        caller.require(Permission::ViewInventory)?;
        self.repo
            .page_at(caller, name_filters(search), sort, limit, index)
            .await
    }

    pub async fn get_category(&self, caller: &Caller, id: &str) -> AppResult<Category> {
        caller.require(Permission::ViewInventory)?;
        self.repo.get(caller, id).await
    }

    pub async fn create_category(
        &self,
        caller: &Caller,
        input: CreateCategoryInput,
    ) -> AppResult<Category> {
        caller.require(Permission::ManageCategories)?;
        check_name(&input.name)?;

        let input = CreateCategoryInput {
            name: input.name.trim().to_string(),
            ..input
        };
        self.repo.create(caller, to_document(&input)?).await
    }

    pub async fn update_category(
        &self,
        caller: &Caller,
        id: &str,
        input: UpdateCategoryInput,
    ) -> AppResult<Category> {
        caller.require(Permission::ManageCategories)?;
        if let Some(name) = &input.name {
            check_name(name)?;
        }
        self.repo.update(caller, id, to_document(&input)?).await
    }

    /// Soft delete a category
    pub async fn delete_category(&self, caller: &Caller, id: &str) -> AppResult<()> {
        caller.require(Permission::ManageCategories)?;
        self.repo.deactivate(caller, id).await
    }
}
