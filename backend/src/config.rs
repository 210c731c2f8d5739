//! Configuration management for the inventory platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with INV_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{SELECTION_STORAGE_KEY, SELECTION_TTL_HOURS};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Document store configuration
    pub store: StoreConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// Tenant selection settings
    pub tenancy: TenancyConfig,

    /// Page size limits
    pub pagination: PaginationConfig,

    /// SKU generation settings
    pub sku: SkuConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// PostgreSQL connection URL, required for the postgres backend
    pub url: Option<String>,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for verifying JWT tokens
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TenancyConfig {
    /// Hours before a privileged selection goes stale
    pub selection_ttl_hours: i64,

    /// Key prefix of persisted selections
    pub selection_storage_key: String,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct PaginationConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct SkuConfig {
    /// Attempts before giving up on a colliding SKU
    pub collision_retries: u32,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("INV_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("store.backend", "memory")?
            .set_default("store.max_connections", 10)?
            .set_default("store.min_connections", 2)?
            .set_default("tenancy.selection_ttl_hours", SELECTION_TTL_HOURS)?
            .set_default("tenancy.selection_storage_key", SELECTION_STORAGE_KEY)?
            .set_default("pagination.default_page_size", 20)?
            .set_default("pagination.max_page_size", 100)?
            .set_default("sku.collision_retries", 5)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (INV_ prefix)
            .add_source(
                Environment::with_prefix("INV")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.store.backend == StoreBackend::Postgres && self.store.url.is_none() {
            return Err(ConfigError::Message(
                "store.url is required for the postgres backend".into(),
            ));
        }
        if self.pagination.default_page_size == 0
            || self.pagination.default_page_size > self.pagination.max_page_size
        {
            return Err(ConfigError::Message(
                "pagination.default_page_size must be between 1 and max_page_size".into(),
            ));
        }
        if self.tenancy.selection_ttl_hours <= 0 {
            return Err(ConfigError::Message(
                "tenancy.selection_ttl_hours must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            selection_ttl_hours: SELECTION_TTL_HOURS,
            selection_storage_key: SELECTION_STORAGE_KEY.to_string(),
        }
    }
}

impl Default for SkuConfig {
    fn default() -> Self {
        Self {
            collision_retries: 5,
        }
    }
}
