//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use inventory_backend::config::{
    Config, JwtConfig, PaginationConfig, ServerConfig, SkuConfig, StoreBackend, StoreConfig,
    TenancyConfig,
};
use inventory_backend::models::Caller;
use inventory_backend::services::{
    InMemorySelectionStore, ScopedQueryBuilder, SelectionStore, TenantContext,
};
use inventory_backend::store::{Document, DocumentStore, InMemoryStore};
use inventory_backend::AppState;
use serde_json::{json, Value};
use shared::{RoleId, RoleRegistry, TenantId, TenantSelection, SELECTION_STORAGE_KEY};

pub const JWT_SECRET: &str = "integration-test-secret";

pub fn test_config() -> Config {
    Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        store: StoreConfig {
            backend: StoreBackend::Memory,
            url: None,
            max_connections: 1,
            min_connections: 1,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
        },
        tenancy: TenancyConfig::default(),
        pagination: PaginationConfig::default(),
        sku: SkuConfig::default(),
    }
}

pub fn caller(role: RoleId, tenant: Option<&str>, session: &str) -> Caller {
    Caller::new(
        format!("{}-user", role),
        RoleRegistry::new().permissions_for(role),
        tenant.map(TenantId::from),
        session,
    )
}

pub fn root(session: &str) -> Caller {
    caller(RoleId::Root, None, session)
}

pub fn manager(tenant: &str) -> Caller {
    caller(RoleId::Manager, Some(tenant), &format!("session-{}", tenant))
}

pub fn operator(tenant: &str) -> Caller {
    caller(RoleId::Operator, Some(tenant), &format!("op-session-{}", tenant))
}

pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

/// Tenant context, query builder and stores wired together
pub struct Harness {
    pub selections: Arc<InMemorySelectionStore>,
    pub tenants: Arc<TenantContext>,
    pub store: Arc<InMemoryStore>,
    pub state: AppState,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let selections = Arc::new(InMemorySelectionStore::new());
        let store = Arc::new(InMemoryStore::new());
        let state = AppState::with_selection_store(config, store.clone(), selections.clone());
        Self {
            selections,
            tenants: state.tenants.clone(),
            store,
            state,
        }
    }

    pub fn queries(&self) -> ScopedQueryBuilder {
        self.state.queries()
    }

    pub fn dyn_store(&self) -> Arc<dyn DocumentStore> {
        self.store.clone()
    }

    /// Write a selection record directly, bypassing the privilege check
    pub fn seed_selection(&self, caller: &Caller, selection: &TenantSelection) {
        let key = format!("{}:{}", SELECTION_STORAGE_KEY, caller.session_id);
        self.selections
            .save(&key, serde_json::to_string(selection).unwrap())
            .unwrap();
    }

    pub fn select(&self, root: &Caller, tenant: &str) {
        self.tenants
            .set_selection(root, Some(TenantId::from(tenant)), false)
            .unwrap();
    }

    pub fn select_all(&self, root: &Caller) {
        self.tenants.set_selection(root, None, true).unwrap();
    }

    pub fn stale_selection(&self, root: &Caller, tenant: &str) {
        let at = Utc::now() - Duration::hours(25);
        self.seed_selection(root, &TenantSelection::single(TenantId::from(tenant), at));
    }

    pub async fn seed_business(&self, id: &str, name: &str) {
        let now = Utc::now().to_rfc3339();
        self.store
            .insert(
                "businesses",
                doc(json!({"id": id, "name": name, "isActive": true, "createdAt": now, "updatedAt": now})),
            )
            .await
            .unwrap();
    }

    /// Insert a raw product record
    pub async fn seed_product(&self, id: &str, tenant: &str, name: &str, active: bool) {
        let now = Utc::now().to_rfc3339();
        self.store
            .insert(
                "products",
                doc(json!({
                    "id": id,
                    "tenantId": tenant,
                    "name": name,
                    "sku": format!("WH1-GEN-{}", id),
                    "categoryId": "cat-1",
                    "warehouseId": "wh-1",
                    "color": null,
                    "size": null,
                    "description": null,
                    "price": "10.00",
                    "stockQuantity": 1,
                    "isActive": active,
                    "createdAt": now,
                    "updatedAt": now,
                })),
            )
            .await
            .unwrap();
    }
}
