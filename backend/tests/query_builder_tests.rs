//! Scoped query builder tests
//!
//! Tests for query scoping including:
//! - Tenant filter first, active filter always present
//! - Default sort, sort validation and page size limits
//! - Write tagging and tenant reassignment guard

mod common;

use common::{caller, doc, manager, root, Harness};
use inventory_backend::error::AppError;
use inventory_backend::services::WriteIntent;
use proptest::prelude::*;
use serde_json::json;
use shared::{
    Category, Cursor, Filter, PageRequest, Product, RoleId, Sort, SortDirection, TenantId,
    Warehouse, ACTIVE_FIELD, TENANT_FIELD,
};

// ============================================================================
// buildQuery
// ============================================================================

#[test]
fn test_single_tenant_filters_come_first() {
    let h = Harness::new();
    let spec = h
        .queries()
        .build_query::<Product>(
            &manager("biz-1"),
            vec![Filter::eq("categoryId", "cat-9")],
            None,
            PageRequest::default(),
        )
        .unwrap();

    assert_eq!(spec.collection, "products");
    assert_eq!(spec.filters[0], Filter::tenant(&TenantId::from("biz-1")));
    assert_eq!(spec.filters[1], Filter::active());
    assert_eq!(spec.filters[2], Filter::eq("categoryId", "cat-9"));
    assert_eq!(spec.filters.len(), 3);
}

#[test]
fn test_all_scope_omits_tenant_but_keeps_active() {
    let h = Harness::new();
    let root = root("s-1");
    h.select_all(&root);

    let spec = h
        .queries()
        .build_query::<Category>(&root, Vec::new(), None, PageRequest::default())
        .unwrap();

    assert!(spec.tenant_filter().is_none());
    assert_eq!(spec.filters, vec![Filter::active()]);
}

#[test]
fn test_missing_selection_propagates() {
    let h = Harness::new();
    let result = h.queries().build_query::<Product>(
        &root("s-1"),
        Vec::new(),
        None,
        PageRequest::default(),
    );
    assert!(matches!(result, Err(AppError::TenantSelectionRequired)));
}

#[test]
fn test_missing_selection_reported_before_bad_input() {
    let h = Harness::new();
    let root = root("s-1");

    let bad_sort = h.queries().build_query::<Product>(
        &root,
        Vec::new(),
        Some(Sort::asc("price")),
        PageRequest::default(),
    );
    assert!(matches!(bad_sort, Err(AppError::TenantSelectionRequired)));

    let reserved = h.queries().build_query::<Product>(
        &root,
        vec![Filter::eq(TENANT_FIELD, "biz-2")],
        None,
        PageRequest::first(0),
    );
    assert!(matches!(reserved, Err(AppError::TenantSelectionRequired)));
}

#[test]
fn test_default_sort_and_limits() {
    let h = Harness::new();
    let queries = h.queries();
    let manager = manager("biz-1");

    let spec = queries
        .build_query::<Warehouse>(&manager, Vec::new(), None, PageRequest::default())
        .unwrap();
    assert_eq!(spec.sort, Sort::asc("name"));
    assert_eq!(spec.limit, 20);

    let spec = queries
        .build_query::<Warehouse>(&manager, Vec::new(), None, PageRequest::first(500))
        .unwrap();
    assert_eq!(spec.limit, 100);

    let result =
        queries.build_query::<Warehouse>(&manager, Vec::new(), None, PageRequest::first(0));
    assert!(matches!(result, Err(AppError::Validation { ref field, .. }) if field == "limit"));
}

#[test]
fn test_cursor_and_sort_passed_through() {
    let h = Harness::new();
    let spec = h
        .queries()
        .build_query::<Product>(
            &manager("biz-1"),
            Vec::new(),
            Some(Sort::desc("stockQuantity")),
            PageRequest {
                cursor: Some(Cursor::new("opaque")),
                limit: Some(5),
            },
        )
        .unwrap();

    assert_eq!(spec.sort.direction, SortDirection::Desc);
    assert_eq!(spec.cursor, Some(Cursor::new("opaque")));
    assert_eq!(spec.limit, 5);
}

#[test]
fn test_unsortable_field_rejected() {
    let h = Harness::new();
    let result = h.queries().build_query::<Category>(
        &manager("biz-1"),
        Vec::new(),
        Some(Sort::asc("tenantId")),
        PageRequest::default(),
    );
    assert!(matches!(result, Err(AppError::Validation { ref field, .. }) if field == "sort"));
}

#[test]
fn test_reserved_filters_rejected() {
    let h = Harness::new();
    for reserved in [
        Filter::eq(TENANT_FIELD, "biz-2"),
        Filter::eq(ACTIVE_FIELD, false),
    ] {
        let result = h.queries().build_query::<Product>(
            &manager("biz-1"),
            vec![reserved],
            None,
            PageRequest::default(),
        );
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }
}

#[test]
fn test_lookup_targets_one_id() {
    let h = Harness::new();
    let spec = h
        .queries()
        .build_lookup::<Product>(&manager("biz-1"), "p-1")
        .unwrap();

    assert_eq!(spec.limit, 1);
    assert_eq!(spec.filters[0], Filter::tenant(&TenantId::from("biz-1")));
    assert_eq!(spec.filters.last(), Some(&Filter::eq("id", "p-1")));
}

// ============================================================================
// tagForWrite
// ============================================================================

#[test]
fn test_create_stamps_tenant_and_active() {
    let h = Harness::new();
    let tagged = h
        .queries()
        .tag_for_write(
            &manager("biz-1"),
            WriteIntent::Create,
            doc(json!({"name": "Tornillos", "tenantId": "biz-evil"})),
        )
        .unwrap();

    assert_eq!(tagged["tenantId"], json!("biz-1"));
    assert_eq!(tagged["isActive"], json!(true));
    assert!(tagged.contains_key("createdAt"));
    assert!(tagged.contains_key("updatedAt"));
}

#[test]
fn test_create_under_all_scope_rejected() {
    let h = Harness::new();
    let root = root("s-1");
    h.select_all(&root);

    let result = h
        .queries()
        .tag_for_write(&root, WriteIntent::Create, doc(json!({"name": "X"})));
    assert!(matches!(result, Err(AppError::NoTenantContext)));
}

#[test]
fn test_create_without_selection_rejected() {
    let h = Harness::new();
    let result =
        h.queries()
            .tag_for_write(&root("s-1"), WriteIntent::Create, doc(json!({"name": "X"})));
    assert!(matches!(result, Err(AppError::NoTenantContext)));
}

#[test]
fn test_root_creates_in_selected_tenant() {
    let h = Harness::new();
    let root = root("s-1");
    h.select(&root, "biz-42");

    let tagged = h
        .queries()
        .tag_for_write(&root, WriteIntent::Create, doc(json!({"name": "X"})))
        .unwrap();
    assert_eq!(tagged["tenantId"], json!("biz-42"));
}

#[test]
fn test_update_rejects_reassignment() {
    let h = Harness::new();
    let owner = TenantId::from("biz-1");

    let result = h.queries().tag_for_write(
        &manager("biz-1"),
        WriteIntent::Update {
            existing_tenant: &owner,
        },
        doc(json!({"name": "Nuevo", "tenantId": "biz-2"})),
    );
    assert!(matches!(result, Err(AppError::TenantReassignment)));
}

#[test]
fn test_update_keeps_tenant_untouched() {
    let h = Harness::new();
    let owner = TenantId::from("biz-1");

    let tagged = h
        .queries()
        .tag_for_write(
            &manager("biz-1"),
            WriteIntent::Update {
                existing_tenant: &owner,
            },
            doc(json!({"name": "Nuevo", "tenantId": "biz-1", "id": "other", "createdAt": "x"})),
        )
        .unwrap();

    assert!(!tagged.contains_key("tenantId"));
    assert!(!tagged.contains_key("id"));
    assert!(!tagged.contains_key("createdAt"));
    assert_eq!(tagged["name"], json!("Nuevo"));
    assert!(tagged.contains_key("updatedAt"));
}

#[test]
fn test_update_of_foreign_record_not_found() {
    let h = Harness::new();
    let owner = TenantId::from("biz-2");

    let result = h.queries().tag_for_write(
        &caller(RoleId::Admin, Some("biz-1"), "s-1"),
        WriteIntent::Update {
            existing_tenant: &owner,
        },
        doc(json!({"name": "X"})),
    );
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

// ============================================================================
// Property Tests
// ============================================================================

fn entity_filter_strategy() -> impl Strategy<Value = Filter> {
    prop_oneof![
        "[a-z]{1,10}".prop_map(|v| Filter::contains("name", &v)),
        "cat-[0-9]{1,4}".prop_map(|v| Filter::eq("categoryId", v)),
        "wh-[0-9]{1,4}".prop_map(|v| Filter::eq("warehouseId", v)),
    ]
}

proptest! {
    /// The tenant predicate is always first, the active predicate second
    #[test]
    fn prop_tenant_filter_always_first(
        tenant in "biz-[a-z0-9]{1,8}",
        filters in proptest::collection::vec(entity_filter_strategy(), 0..6),
    ) {
        let h = Harness::new();
        let spec = h
            .queries()
            .build_query::<Product>(&manager(&tenant), filters.clone(), None, PageRequest::default())
            .unwrap();

        prop_assert_eq!(&spec.filters[0], &Filter::tenant(&TenantId::new(tenant)));
        prop_assert_eq!(&spec.filters[1], &Filter::active());
        prop_assert_eq!(&spec.filters[2..], &filters[..]);
    }

    /// Page sizes are always within 1..=max
    #[test]
    fn prop_limit_clamped(limit in 1u32..10_000) {
        let h = Harness::new();
        let spec = h
            .queries()
            .build_query::<Category>(&manager("biz-1"), Vec::new(), None, PageRequest::first(limit))
            .unwrap();
        prop_assert!(spec.limit >= 1 && spec.limit <= 100);
        prop_assert_eq!(spec.limit, limit.min(100));
    }
}
