//! Product management service

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    validate_attribute_code, validate_name, validate_price, validate_stock_quantity, Category,
    sequence_of, ClassificationAttributes, Filter, LocationContext, Page, PageRequest, Permission,
    Product, SkuCode, Sort, TenantId, Warehouse,
};

use crate::config::SkuConfig;
use crate::error::{AppError, AppResult};
use crate::models::Caller;
use crate::services::query_builder::ScopedQueryBuilder;
use crate::services::scoped::{to_document, IndexedPage, ScopedRepository};
use crate::services::sku::SkuService;
use crate::store::DocumentStore;

/// Product service for the caller's tenant
#[derive(Clone)]
pub struct ProductService {
    products: ScopedRepository<Product>,
    categories: ScopedRepository<Category>,
    warehouses: ScopedRepository<Warehouse>,
    skus: Arc<SkuService>,
    sku_config: SkuConfig,
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    pub name: String,
    pub category_id: String,
    pub warehouse_id: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub stock_quantity: i64,
}

/// Input for updating a product
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

/// Filters accepted by the product listing
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilters {
    pub search: Option<String>,
    pub category_id: Option<String>,
    pub warehouse_id: Option<String>,
    pub sku: Option<String>,
}

impl ProductFilters {
    fn into_filters(self) -> Vec<Filter> {
        let mut filters = Vec::new();
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            filters.push(Filter::contains("name", search));
        }
        if let Some(category_id) = self.category_id {
            filters.push(Filter::eq("categoryId", category_id));
        }
        if let Some(warehouse_id) = self.warehouse_id {
            filters.push(Filter::eq("warehouseId", warehouse_id));
        }
        if let Some(sku) = self.sku {
            filters.push(Filter::eq("sku", sku));
        }
        filters
    }
}

/// Stored shape of a new product, before tenant tagging
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewProduct<'a> {
    name: &'a str,
    sku: &'a str,
    category_id: &'a str,
    warehouse_id: &'a str,
    color: Option<String>,
    size: Option<String>,
    description: Option<&'a str>,
    price: Decimal,
    stock_quantity: i64,
}

fn normalize_attribute(field: &str, raw: Option<&str>) -> AppResult<Option<String>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let code = raw.to_uppercase();
    validate_attribute_code(&code).map_err(|msg| {
        AppError::validation(field, msg, "El código debe tener de 1 a 3 caracteres alfanuméricos")
    })?;
    Ok(Some(code))
}

fn check_amounts(price: Option<Decimal>, stock_quantity: Option<i64>) -> AppResult<()> {
    if let Some(price) = price {
        validate_price(price)
            .map_err(|msg| AppError::validation("price", msg, "El precio no puede ser negativo"))?;
    }
    if let Some(quantity) = stock_quantity {
        validate_stock_quantity(quantity).map_err(|msg| {
            AppError::validation("stockQuantity", msg, "La existencia no puede ser negativa")
        })?;
    }
    Ok(())
}

fn check_name(name: &str) -> AppResult<()> {
    validate_name(name).map_err(|msg| {
        AppError::validation("name", msg, "El nombre debe tener entre 1 y 120 caracteres")
    })
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(
        store: Arc<dyn DocumentStore>,
        queries: ScopedQueryBuilder,
        skus: Arc<SkuService>,
        sku_config: SkuConfig,
    ) -> Self {
        Self {
            products: ScopedRepository::new(store.clone(), queries.clone()),
            categories: ScopedRepository::new(store.clone(), queries.clone()),
            warehouses: ScopedRepository::new(store, queries),
            skus,
            sku_config,
        }
    }

    /// List active products
    pub async fn list_products(
        &self,
        caller: &Caller,
        filters: ProductFilters,
        sort: Option<Sort>,
        page: PageRequest,
    ) -> AppResult<Page<Product>> {
        caller.require(Permission::ViewInventory)?;
        self.products
            .list(caller, filters.into_filters(), sort, page)
            .await
    }

    /// Jump to a page by number
    pub async fn product_page(
        &self,
        caller: &Caller,
        filters: ProductFilters,
        sort: Option<Sort>,
        limit: Option<u32>,
        index: usize,
    ) -> AppResult<IndexedPage<Product>> {
        caller.require(Permission::ViewInventory)?;
        self.products
            .page_at(caller, filters.into_filters(), sort, limit, index)
            .await
    }

    pub async fn get_product(&self, caller: &Caller, id: &str) -> AppResult<Product> {
        caller.require(Permission::ViewInventory)?;
        self.products.get(caller, id).await
    }

    /// Create a product with a freshly generated SKU
    pub async fn create_product(
        &self,
        caller: &Caller,
        input: CreateProductInput,
    ) -> AppResult<Product> {
        caller.require(Permission::ManageProducts)?;
        check_name(&input.name)?;
        check_amounts(Some(input.price), Some(input.stock_quantity))?;
        let color = normalize_attribute("color", input.color.as_deref())?;
        let size = normalize_attribute("size", input.size.as_deref())?;

        let tenant_id = self.products.queries().write_tenant(caller)?;

        // Both lookups are tenant scoped: foreign or inactive records are not found
        let category = self.categories.get(caller, &input.category_id).await?;
        let warehouse = self.warehouses.get(caller, &input.warehouse_id).await?;
        if category.tenant_id != tenant_id || warehouse.tenant_id != tenant_id {
            return Err(AppError::validation(
                "categoryId",
                "Category and warehouse must belong to the selected business",
                "La categoría y el almacén deben pertenecer al negocio seleccionado",
            ));
        }

        let location = LocationContext {
            warehouse_code: warehouse.code.clone(),
        };
        let attributes = ClassificationAttributes {
            category: Some(category.name.clone()),
            color: color.clone(),
            size: size.clone(),
        };

        let attempts = self.sku_config.collision_retries.max(1);
        for attempt in 1..=attempts {
            let sku = self
                .skus
                .generate(caller, &tenant_id, &location, &attributes)?;

            // Deactivated products keep their codes
            let taken = self
                .products
                .exists_in_tenant(&tenant_id, vec![Filter::eq("sku", sku.as_str())])
                .await?;
            if taken {
                let highest = self.highest_sequence(&tenant_id, &sku).await?;
                self.skus.advance_past(caller, highest)?;
                tracing::warn!(sku = %sku, attempt, highest, "SKU already in use, generating another");
                continue;
            }

            let record = NewProduct {
                name: input.name.trim(),
                sku: sku.as_str(),
                category_id: &category.id,
                warehouse_id: &warehouse.id,
                color,
                size,
                description: input.description.as_deref(),
                price: input.price,
                stock_quantity: input.stock_quantity,
            };
            return self.products.create(caller, to_document(&record)?).await;
        }

        Err(AppError::Conflict {
            resource: "sku".to_string(),
            message: "Could not generate a unique SKU, please retry".to_string(),
            message_es: "No se pudo generar un SKU único, inténtalo de nuevo".to_string(),
        })
    }

    /// Highest sequence the tenant already uses under `sku`'s prefix
    async fn highest_sequence(&self, tenant_id: &TenantId, sku: &SkuCode) -> AppResult<u32> {
        let prefix = sku.prefix();
        let existing = self
            .products
            .scan_tenant(tenant_id, vec![Filter::contains("sku", prefix)])
            .await?;
        Ok(existing
            .iter()
            .filter_map(|product| sequence_of(&product.sku, prefix))
            .max()
            .unwrap_or(0))
    }

    /// Sequence the caller's session will put on its next SKU
    pub fn next_sku_sequence(&self, caller: &Caller) -> AppResult<u32> {
        caller.require(Permission::ManageProducts)?;
        self.skus.next_sequence(caller)
    }

    pub async fn update_product(
        &self,
        caller: &Caller,
        id: &str,
        input: UpdateProductInput,
    ) -> AppResult<Product> {
        caller.require(Permission::ManageProducts)?;
        if let Some(name) = &input.name {
            check_name(name)?;
        }
        check_amounts(input.price, input.stock_quantity)?;
        self.products.update(caller, id, to_document(&input)?).await
    }

    /// Soft delete a product
    pub async fn delete_product(&self, caller: &Caller, id: &str) -> AppResult<()> {
        caller.require(Permission::ManageProducts)?;
        self.products.deactivate(caller, id).await
    }
}
