//! Route definitions for the inventory platform

use axum::{middleware, routing::get, Router};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - tenant selection
        .nest("/tenant-selection", selection_routes(state.clone()))
        // Protected routes - business directory
        .nest("/businesses", business_routes(state.clone()))
        // Protected routes - catalog
        .nest("/categories", category_routes(state.clone()))
        .nest("/warehouses", warehouse_routes(state.clone()))
        .nest("/products", product_routes(state))
}

/// Tenant selection routes (protected)
fn selection_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::get_selection)
                .put(handlers::set_selection)
                .delete(handlers::clear_selection),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Business directory routes (protected)
fn business_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_businesses).post(handlers::create_business))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Category routes (protected)
fn category_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_categories).post(handlers::create_category))
        .route("/pages/:index", get(handlers::get_category_page))
        .route(
            "/:category_id",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Warehouse routes (protected)
fn warehouse_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_warehouses).post(handlers::create_warehouse))
        .route("/pages/:index", get(handlers::get_warehouse_page))
        .route(
            "/:warehouse_id",
            get(handlers::get_warehouse)
                .put(handlers::update_warehouse)
                .delete(handlers::delete_warehouse),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Product routes (protected)
fn product_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route("/pages/:index", get(handlers::get_product_page))
        .route("/next-sequence", get(handlers::get_next_sku_sequence))
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
