//! Business logic services for the inventory platform

pub mod business;
pub mod category;
pub mod pagination;
pub mod product;
pub mod query_builder;
pub mod scoped;
pub mod sku;
pub mod tenant_context;
pub mod warehouse;

pub use business::BusinessService;
pub use category::CategoryService;
pub use pagination::{FetchOutcome, FetchTicket, PageAccumulator};
pub use product::ProductService;
pub use query_builder::{ScopedQueryBuilder, WriteIntent};
pub use scoped::{IndexedPage, ScopedRepository};
pub use sku::SkuService;
pub use tenant_context::{InMemorySelectionStore, SelectionStore, TenantContext};
pub use warehouse::WarehouseService;
