//! Inventory models: categories, warehouses and products

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ScopedEntity;
use crate::types::TenantId;

/// A product category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub tenant_id: TenantId,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScopedEntity for Category {
    const COLLECTION: &'static str = "categories";
    const LABEL: &'static str = "Category";
    const SORTABLE_FIELDS: &'static [&'static str] = &["name", "createdAt", "updatedAt"];

    fn id(&self) -> &str {
        &self.id
    }

    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

/// A physical stock location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: String,
    pub tenant_id: TenantId,
    pub name: String,
    /// Three character location code, first segment of every SKU stored here
    pub code: String,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScopedEntity for Warehouse {
    const COLLECTION: &'static str = "warehouses";
    const LABEL: &'static str = "Warehouse";
    const SORTABLE_FIELDS: &'static [&'static str] = &["name", "code", "createdAt", "updatedAt"];

    fn id(&self) -> &str {
        &self.id
    }

    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

/// An inventory item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub tenant_id: TenantId,
    pub name: String,
    pub sku: String,
    pub category_id: String,
    pub warehouse_id: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScopedEntity for Product {
    const COLLECTION: &'static str = "products";
    const LABEL: &'static str = "Product";
    const SORTABLE_FIELDS: &'static [&'static str] =
        &["name", "sku", "stockQuantity", "createdAt", "updatedAt"];

    fn id(&self) -> &str {
        &self.id
    }

    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}
