//! Page accumulator tests
//!
//! Tests for cursor pagination state including:
//! - Forward walks and exhaustion
//! - Deduplication by id and stale results
//! - Reset semantics and page index re-walks
//! - Failed fetches leave the state unchanged

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use common::{doc, manager, Harness};
use inventory_backend::error::AppError;
use inventory_backend::services::{FetchOutcome, PageAccumulator};
use inventory_backend::store::{Document, DocumentStore, InMemoryStore, StoreError};
use serde_json::json;
use shared::{Cursor, Filter, Page, PageRequest, Product, QuerySpec, Sort};

/// Store wrapper that fails every query while `failing` is set
struct FlakyStore {
    inner: Arc<InMemoryStore>,
    failing: AtomicBool,
}

impl FlakyStore {
    fn new(inner: Arc<InMemoryStore>) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(false),
        }
    }

    fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    fn backend_name(&self) -> &'static str {
        "flaky"
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
        sort: &Sort,
        cursor: Option<&Cursor>,
        limit: u32,
    ) -> Result<Page<Document>, StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }
        self.inner.query(collection, filters, sort, cursor, limit).await
    }

    async fn insert(&self, collection: &str, record: Document) -> Result<String, StoreError> {
        self.inner.insert(collection, record).await
    }

    async fn update(&self, collection: &str, id: &str, partial: Document) -> Result<(), StoreError> {
        self.inner.update(collection, id, partial).await
    }
}

async fn seeded() -> Harness {
    let h = Harness::new();
    for (id, name) in [
        ("p-1", "Alicate"),
        ("p-2", "Broca"),
        ("p-3", "Cinta"),
        ("p-4", "Destornillador"),
        ("p-5", "Escuadra"),
    ] {
        h.seed_product(id, "biz-1", name, true).await;
    }
    // Noise that must never show up
    h.seed_product("x-1", "biz-2", "Alambre", true).await;
    h.seed_product("x-2", "biz-1", "Abrazadera", false).await;
    h
}

fn spec(h: &Harness, limit: u32) -> QuerySpec {
    h.queries()
        .build_query::<Product>(&manager("biz-1"), Vec::new(), None, PageRequest::first(limit))
        .unwrap()
}

fn names(items: &[Product]) -> Vec<&str> {
    items.iter().map(|p| p.name.as_str()).collect()
}

fn product_doc(id: &str, name: &str) -> Document {
    doc(json!({
        "id": id,
        "tenantId": "biz-1",
        "name": name,
        "sku": format!("WH1-GEN-{}", id),
        "categoryId": "cat-1",
        "warehouseId": "wh-1",
        "color": null,
        "size": null,
        "description": null,
        "price": "1.00",
        "stockQuantity": 0,
        "isActive": true,
        "createdAt": "2024-01-01T00:00:00.000Z",
        "updatedAt": "2024-01-01T00:00:00.000Z",
    }))
}

// ============================================================================
// Forward Walk
// ============================================================================

#[tokio::test]
async fn test_walks_all_pages_in_order() {
    let h = seeded().await;
    let store = h.dyn_store();
    let mut pages = PageAccumulator::<Product>::new(spec(&h, 2));

    assert_eq!(
        pages.fetch_next(store.as_ref()).await.unwrap(),
        FetchOutcome::Applied { added: 2 }
    );
    assert_eq!(names(pages.current_page()), vec!["Alicate", "Broca"]);
    assert!(pages.has_more());
    assert!(pages.cursor().is_some());

    pages.fetch_next(store.as_ref()).await.unwrap();
    assert_eq!(names(pages.current_page()), vec!["Cinta", "Destornillador"]);

    pages.fetch_next(store.as_ref()).await.unwrap();
    assert_eq!(names(pages.current_page()), vec!["Escuadra"]);
    assert!(!pages.has_more());
    assert_eq!(pages.pages_loaded(), 3);

    assert_eq!(
        pages.fetch_next(store.as_ref()).await.unwrap(),
        FetchOutcome::Exhausted
    );
    assert_eq!(pages.items().len(), 5);
    assert!(pages.items().iter().all(|p| p.tenant_id.as_str() == "biz-1"));
}

#[tokio::test]
async fn test_empty_collection_exhausts_after_first_page() {
    let h = Harness::new();
    let store = h.dyn_store();
    let mut pages = PageAccumulator::<Product>::new(spec(&h, 10));

    assert_eq!(
        pages.fetch_next(store.as_ref()).await.unwrap(),
        FetchOutcome::Applied { added: 0 }
    );
    assert!(!pages.has_more());
    assert!(pages.items().is_empty());
}

// ============================================================================
// Deduplication and Stale Results
// ============================================================================

#[tokio::test]
async fn test_overlapping_pages_are_deduplicated() {
    let h = Harness::new();
    let mut pages = PageAccumulator::<Product>::new(spec(&h, 2));

    let ticket = pages.begin_fetch();
    pages
        .apply_page(
            ticket.token,
            Page {
                items: vec![product_doc("p-1", "Alicate"), product_doc("p-2", "Broca")],
                next_cursor: Some(Cursor::new("c1")),
                has_more: true,
            },
        )
        .unwrap();

    // A record shifted between requests and comes back again
    let ticket = pages.begin_fetch();
    let outcome = pages
        .apply_page(
            ticket.token,
            Page {
                items: vec![product_doc("p-2", "Broca"), product_doc("p-3", "Cinta")],
                next_cursor: None,
                has_more: false,
            },
        )
        .unwrap();

    assert_eq!(outcome, FetchOutcome::Applied { added: 1 });
    assert_eq!(names(pages.items()), vec!["Alicate", "Broca", "Cinta"]);
    assert_eq!(names(pages.current_page()), vec!["Cinta"]);
    assert!(!pages.has_more());
}

#[tokio::test]
async fn test_superseded_result_is_dropped() {
    let h = Harness::new();
    let mut pages = PageAccumulator::<Product>::new(spec(&h, 2));

    let old = pages.begin_fetch();
    pages.reset(Sort::desc("stockQuantity"));

    let outcome = pages
        .apply_page(
            old.token,
            Page {
                items: vec![product_doc("p-1", "Alicate")],
                next_cursor: None,
                has_more: false,
            },
        )
        .unwrap();

    assert_eq!(outcome, FetchOutcome::Stale);
    assert!(pages.items().is_empty());
    assert_eq!(pages.pages_loaded(), 0);
    assert!(pages.has_more());
}

#[tokio::test]
async fn test_undecodable_page_leaves_state_untouched() {
    let h = Harness::new();
    let mut pages = PageAccumulator::<Product>::new(spec(&h, 2));

    let ticket = pages.begin_fetch();
    let result = pages.apply_page(
        ticket.token,
        Page {
            items: vec![
                product_doc("p-1", "Alicate"),
                doc(json!({"id": "broken", "name": 42})),
            ],
            next_cursor: Some(Cursor::new("c1")),
            has_more: true,
        },
    );

    assert!(matches!(result, Err(AppError::QueryFailed(_))));
    assert!(pages.items().is_empty());
    assert_eq!(pages.pages_loaded(), 0);
}

// ============================================================================
// Reset
// ============================================================================

#[tokio::test]
async fn test_reset_matches_fresh_first_page() {
    let h = seeded().await;
    let store = h.dyn_store();

    let mut walked = PageAccumulator::<Product>::new(spec(&h, 2));
    walked.fetch_next(store.as_ref()).await.unwrap();
    walked.fetch_next(store.as_ref()).await.unwrap();

    let sort = Sort::desc("name");
    walked.reset(sort.clone());
    assert!(walked.items().is_empty());
    assert!(walked.cursor().is_none());
    walked.fetch_next(store.as_ref()).await.unwrap();

    let mut fresh = PageAccumulator::<Product>::new(spec(&h, 2).with_sort(sort));
    fresh.fetch_next(store.as_ref()).await.unwrap();

    assert_eq!(walked.items(), fresh.items());
    assert_eq!(names(walked.items()), vec!["Escuadra", "Destornillador"]);
}

#[tokio::test]
async fn test_reset_with_new_filters() {
    let h = seeded().await;
    let store = h.dyn_store();
    let mut pages = PageAccumulator::<Product>::new(spec(&h, 10));
    pages.fetch_next(store.as_ref()).await.unwrap();
    assert_eq!(pages.items().len(), 5);

    let narrowed = h
        .queries()
        .build_query::<Product>(
            &manager("biz-1"),
            vec![Filter::contains("name", "CIN")],
            None,
            PageRequest::first(10),
        )
        .unwrap();
    pages.reset_with(narrowed);
    pages.fetch_next(store.as_ref()).await.unwrap();

    assert_eq!(names(pages.items()), vec!["Cinta"]);
}

// ============================================================================
// Page Index Navigation
// ============================================================================

#[tokio::test]
async fn test_fetch_page_at_index_rewalks() {
    let h = seeded().await;
    let store = h.dyn_store();
    let mut pages = PageAccumulator::<Product>::new(spec(&h, 2));

    let third = pages.fetch_page_at_index(store.as_ref(), 2).await.unwrap();
    assert_eq!(names(&third), vec!["Escuadra"]);
    assert_eq!(pages.pages_loaded(), 3);

    // Going back walks from the start again
    let first = pages.fetch_page_at_index(store.as_ref(), 0).await.unwrap();
    assert_eq!(names(&first), vec!["Alicate", "Broca"]);
    assert_eq!(pages.pages_loaded(), 1);
    assert!(pages.has_more());
}

#[tokio::test]
async fn test_fetch_page_past_the_end() {
    let h = seeded().await;
    let store = h.dyn_store();
    let mut pages = PageAccumulator::<Product>::new(spec(&h, 2));
    pages.fetch_next(store.as_ref()).await.unwrap();

    let result = pages.fetch_page_at_index(store.as_ref(), 3).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(pages.pages_loaded(), 1);
    assert_eq!(names(pages.items()), vec!["Alicate", "Broca"]);
}

// ============================================================================
// Failure Handling
// ============================================================================

#[tokio::test]
async fn test_failed_fetch_can_be_retried() {
    let h = seeded().await;
    let flaky = FlakyStore::new(h.store.clone());
    let mut pages = PageAccumulator::<Product>::new(spec(&h, 2));

    pages.fetch_next(&flaky).await.unwrap();
    let cursor_before = pages.cursor().cloned();

    flaky.fail(true);
    let result = pages.fetch_next(&flaky).await;
    assert!(matches!(result, Err(AppError::QueryFailed(_))));
    assert_eq!(pages.cursor().cloned(), cursor_before);
    assert_eq!(pages.pages_loaded(), 1);
    assert_eq!(pages.items().len(), 2);

    flaky.fail(false);
    pages.fetch_next(&flaky).await.unwrap();
    assert_eq!(names(pages.current_page()), vec!["Cinta", "Destornillador"]);
    assert_eq!(pages.items().len(), 4);
}

#[tokio::test]
async fn test_failed_rewalk_keeps_previous_state() {
    let h = seeded().await;
    let flaky = FlakyStore::new(h.store.clone());
    let mut pages = PageAccumulator::<Product>::new(spec(&h, 2));
    pages.fetch_next(&flaky).await.unwrap();
    pages.fetch_next(&flaky).await.unwrap();

    flaky.fail(true);
    let result = pages.fetch_page_at_index(&flaky, 0).await;

    assert!(result.is_err());
    assert_eq!(pages.pages_loaded(), 2);
    assert_eq!(pages.items().len(), 4);
}
