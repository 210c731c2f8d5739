//! Tenant-scoped inventory platform backend
//!
//! Multi-tenant catalog (categories, warehouses, products) served over HTTP.
//! Every query is scoped to the caller's effective tenant; platform root
//! accounts pick the tenant they work on per browsing session.

use std::sync::Arc;

use axum::{routing::get, Router};
use chrono::Duration;
use shared::RoleRegistry;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;

use services::{
    BusinessService, CategoryService, InMemorySelectionStore, ProductService, ScopedQueryBuilder,
    SelectionStore, SkuService, TenantContext, WarehouseService,
};
use store::DocumentStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn DocumentStore>,
    pub tenants: Arc<TenantContext>,
    pub roles: Arc<RoleRegistry>,
    pub skus: Arc<SkuService>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn DocumentStore>) -> Self {
        let selections: Arc<dyn SelectionStore> = Arc::new(InMemorySelectionStore::new());
        Self::with_selection_store(config, store, selections)
    }

    pub fn with_selection_store(
        config: Config,
        store: Arc<dyn DocumentStore>,
        selections: Arc<dyn SelectionStore>,
    ) -> Self {
        let tenants = TenantContext::new(
            selections,
            Duration::hours(config.tenancy.selection_ttl_hours),
        )
        .with_storage_key(config.tenancy.selection_storage_key.clone());

        Self {
            config: Arc::new(config),
            store,
            tenants: Arc::new(tenants),
            roles: Arc::new(RoleRegistry::new()),
            skus: Arc::new(SkuService::new()),
        }
    }

    pub fn queries(&self) -> ScopedQueryBuilder {
        ScopedQueryBuilder::new(self.tenants.clone(), self.config.pagination)
    }

    pub fn categories(&self) -> CategoryService {
        CategoryService::new(self.store.clone(), self.queries())
    }

    pub fn warehouses(&self) -> WarehouseService {
        WarehouseService::new(self.store.clone(), self.queries())
    }

    pub fn products(&self) -> ProductService {
        ProductService::new(
            self.store.clone(),
            self.queries(),
            self.skus.clone(),
            self.config.sku,
        )
    }

    pub fn businesses(&self) -> BusinessService {
        BusinessService::new(self.store.clone(), self.config.pagination)
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Inventory Platform API v1.0"
}
