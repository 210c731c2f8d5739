//! Inventory Platform - Backend Server
//!
//! Multi-tenant inventory service: categories, warehouses and products
//! scoped per business, with a platform root role that works across them.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use inventory_backend::{
    config::{Config, StoreBackend},
    create_app,
    store::{DocumentStore, InMemoryStore, PgDocumentStore},
    AppState,
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "inventory_server=debug,inventory_backend=debug,tower_http=debug,sqlx=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Inventory Platform Server");
    tracing::info!("Environment: {}", config.environment);

    let store: Arc<dyn DocumentStore> = match config.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            Arc::new(InMemoryStore::new())
        }
        StoreBackend::Postgres => {
            let url = config
                .store
                .url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("store.url is required for the postgres backend"))?;

            tracing::info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.store.max_connections)
                .min_connections(config.store.min_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(url)
                .await?;
            tracing::info!("Database connection established");

            // Run migrations in development
            if config.environment == "development" {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("./migrations").run(&db_pool).await?;
                tracing::info!("Migrations completed");
            }

            Arc::new(PgDocumentStore::new(db_pool))
        }
    };

    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));

    // Build application
    let app = create_app(AppState::new(config, store));

    // Start server
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
