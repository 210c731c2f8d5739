//! Document store capability
//!
//! Collections of JSON documents queried with conjunctive filters, a single
//! sort key and opaque keyset cursors. Two implementations ship: an
//! in-memory store for development and tests, and a PostgreSQL store that
//! keeps documents in one JSONB table.

use async_trait::async_trait;
use serde_json::{Map, Value};
use shared::{Cursor, Filter, Page, QuerySpec, Sort};
use thiserror::Error;

pub mod cursor;
pub mod memory;
pub mod postgres;

pub use cursor::KeysetPosition;
pub use memory::InMemoryStore;
pub use postgres::PgDocumentStore;

/// A stored record
pub type Document = Map<String, Value>;

/// Errors raised by a document store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid cursor")]
    InvalidCursor,

    #[error("Unsupported filter on field {0}")]
    UnsupportedFilter(String),

    #[error("{collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("{collection}/{id} already exists")]
    Duplicate { collection: String, id: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short name reported by the health endpoint
    fn backend_name(&self) -> &'static str;

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Fetch one page. Results are ordered by `(sort.field, id)` in the sort
    /// direction, and `cursor` must come from a previous page of the same
    /// query.
    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
        sort: &Sort,
        cursor: Option<&Cursor>,
        limit: u32,
    ) -> Result<Page<Document>, StoreError>;

    /// Insert a record and return its id. A missing `id` field is generated.
    async fn insert(&self, collection: &str, record: Document) -> Result<String, StoreError>;

    /// Shallow-merge `partial` into the stored record
    async fn update(&self, collection: &str, id: &str, partial: Document) -> Result<(), StoreError>;

    /// Execute a prepared query
    async fn run(&self, spec: &QuerySpec) -> Result<Page<Document>, StoreError> {
        self.query(
            &spec.collection,
            &spec.filters,
            &spec.sort,
            spec.cursor.as_ref(),
            spec.limit,
        )
        .await
    }
}

/// Read the `id` of a record, or assign a fresh one
pub(crate) fn ensure_id(record: &mut Document) -> String {
    match record.get(shared::ID_FIELD).and_then(Value::as_str) {
        Some(id) => id.to_string(),
        None => {
            let id = uuid::Uuid::new_v4().to_string();
            record.insert(shared::ID_FIELD.to_string(), Value::String(id.clone()));
            id
        }
    }
}
