//! Shared types and models for the tenant-scoped inventory platform
//!
//! This crate contains types shared between the backend, the browser client
//! (via WASM), and other components of the system.

pub mod error;
pub mod models;
pub mod query;
pub mod sku;
pub mod types;
pub mod validation;

pub use error::*;
pub use models::*;
pub use query::*;
pub use sku::*;
pub use types::*;
pub use validation::*;
