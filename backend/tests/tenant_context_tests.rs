//! Tenant context tests
//!
//! Tests for effective tenant resolution including:
//! - Ordinary callers are pinned to their own business
//! - Privileged callers need a fresh, explicit selection
//! - Selection writes are privileged and session scoped

mod common;

use chrono::{Duration, Utc};
use common::{caller, manager, operator, root, Harness};
use inventory_backend::error::AppError;
use proptest::prelude::*;
use shared::{EffectiveTenant, RoleId, TenantId, TenantSelection};

// ============================================================================
// Non-privileged Callers
// ============================================================================

#[test]
fn test_ordinary_caller_resolves_to_assigned_tenant() {
    let h = Harness::new();
    let manager = manager("biz-7");

    assert_eq!(
        h.tenants.resolve_effective_tenant(&manager).unwrap(),
        EffectiveTenant::Single(TenantId::from("biz-7"))
    );
    assert!(h.tenants.is_selection_valid(&manager).unwrap());
}

#[test]
fn test_ordinary_caller_ignores_stored_selection() {
    let h = Harness::new();
    let admin = caller(RoleId::Admin, Some("biz-1"), "shared-session");

    // A stray "all tenants" record under the same session key
    h.seed_selection(&admin, &TenantSelection::all(Utc::now()));

    assert_eq!(
        h.tenants.resolve_effective_tenant(&admin).unwrap(),
        EffectiveTenant::Single(TenantId::from("biz-1"))
    );
}

#[test]
fn test_ordinary_caller_without_tenant_has_no_context() {
    let h = Harness::new();
    let orphan = caller(RoleId::Operator, None, "s-1");

    assert!(matches!(
        h.tenants.resolve_effective_tenant(&orphan),
        Err(AppError::NoTenantContext)
    ));
}

#[test]
fn test_ordinary_caller_cannot_select() {
    let h = Harness::new();
    let operator = operator("biz-1");

    let result = h
        .tenants
        .set_selection(&operator, Some(TenantId::from("biz-2")), false);
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let result = h.tenants.set_selection(&operator, None, true);
    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert!(h.tenants.current_selection(&operator).unwrap().is_none());
}

// ============================================================================
// Privileged Callers
// ============================================================================

#[test]
fn test_root_without_selection_must_select() {
    let h = Harness::new();
    let root = root("s-1");

    assert!(matches!(
        h.tenants.resolve_effective_tenant(&root),
        Err(AppError::TenantSelectionRequired)
    ));
    assert!(!h.tenants.is_selection_valid(&root).unwrap());
}

#[test]
fn test_root_unset_record_is_not_show_all() {
    let h = Harness::new();
    let root = root("s-1");
    h.seed_selection(&root, &TenantSelection::unset(Utc::now()));

    assert!(matches!(
        h.tenants.resolve_effective_tenant(&root),
        Err(AppError::TenantSelectionRequired)
    ));
}

#[test]
fn test_root_single_and_all_selections() {
    let h = Harness::new();
    let root = root("s-1");

    h.select(&root, "biz-42");
    assert_eq!(
        h.tenants.resolve_effective_tenant(&root).unwrap(),
        EffectiveTenant::Single(TenantId::from("biz-42"))
    );

    h.select_all(&root);
    assert_eq!(
        h.tenants.resolve_effective_tenant(&root).unwrap(),
        EffectiveTenant::All
    );
    assert!(h.tenants.is_selection_valid(&root).unwrap());
}

#[test]
fn test_stale_selection_requires_reselection() {
    let h = Harness::new();
    let root = root("s-1");
    h.stale_selection(&root, "biz-42");

    assert!(!h.tenants.is_selection_valid(&root).unwrap());
    assert!(matches!(
        h.tenants.resolve_effective_tenant(&root),
        Err(AppError::TenantSelectionRequired)
    ));
}

#[test]
fn test_selection_expires_exactly_at_ttl() {
    let h = Harness::new();
    let root = root("s-1");
    let selected_at = Utc::now();
    h.seed_selection(
        &root,
        &TenantSelection::single(TenantId::from("biz-1"), selected_at),
    );

    let just_before = selected_at + Duration::hours(24) - Duration::milliseconds(1);
    let at_ttl = selected_at + Duration::hours(24);

    assert!(h.tenants.resolve_at(&root, just_before).is_ok());
    assert!(matches!(
        h.tenants.resolve_at(&root, at_ttl),
        Err(AppError::TenantSelectionRequired)
    ));
}

#[test]
fn test_empty_selection_is_noop() {
    let h = Harness::new();
    let root = root("s-1");
    h.select(&root, "biz-42");
    let before = h.tenants.current_selection(&root).unwrap();

    h.tenants.set_selection(&root, None, false).unwrap();

    assert_eq!(h.tenants.current_selection(&root).unwrap(), before);
}

#[test]
fn test_tenant_and_show_all_together_rejected() {
    let h = Harness::new();
    let root = root("s-1");

    let result = h
        .tenants
        .set_selection(&root, Some(TenantId::from("biz-1")), true);
    assert!(matches!(result, Err(AppError::Validation { .. })));
    assert!(h.tenants.current_selection(&root).unwrap().is_none());
}

#[test]
fn test_clear_selection_resets_to_unset() {
    let h = Harness::new();
    let root = root("s-1");
    h.select_all(&root);

    h.tenants.clear_selection(&root).unwrap();

    assert!(h.tenants.current_selection(&root).unwrap().is_none());
    assert!(matches!(
        h.tenants.resolve_effective_tenant(&root),
        Err(AppError::TenantSelectionRequired)
    ));
}

#[test]
fn test_selection_does_not_leak_across_sessions() {
    let h = Harness::new();
    let first = root("s-1");
    let second = root("s-2");

    h.select_all(&first);

    assert!(h.tenants.resolve_effective_tenant(&first).is_ok());
    assert!(matches!(
        h.tenants.resolve_effective_tenant(&second),
        Err(AppError::TenantSelectionRequired)
    ));
}

#[test]
fn test_unreadable_record_counts_as_no_selection() {
    use inventory_backend::services::SelectionStore;

    let h = Harness::new();
    let root = root("s-1");
    h.selections
        .save(&h.tenants.session_key(&root), "{not json".to_string())
        .unwrap();

    assert!(h.tenants.current_selection(&root).unwrap().is_none());
    assert!(matches!(
        h.tenants.resolve_effective_tenant(&root),
        Err(AppError::TenantSelectionRequired)
    ));
}

// ============================================================================
// Property Tests
// ============================================================================

fn role_strategy() -> impl Strategy<Value = RoleId> {
    prop_oneof![
        Just(RoleId::Admin),
        Just(RoleId::Manager),
        Just(RoleId::Operator),
    ]
}

proptest! {
    /// Stored selections never change what an ordinary caller sees
    #[test]
    fn prop_ordinary_callers_always_single(
        role in role_strategy(),
        assigned in "biz-[a-z0-9]{1,8}",
        stored in proptest::option::of("biz-[a-z0-9]{1,8}"),
        show_all in any::<bool>(),
        age_hours in 0i64..72,
    ) {
        let h = Harness::new();
        let caller = caller(role, Some(&assigned), "session");
        let selection = TenantSelection {
            tenant_id: stored.map(TenantId::new),
            show_all,
            selected_at: Utc::now() - Duration::hours(age_hours),
        };
        h.seed_selection(&caller, &selection);

        prop_assert_eq!(
            h.tenants.resolve_effective_tenant(&caller).unwrap(),
            EffectiveTenant::Single(TenantId::new(assigned))
        );
    }

    /// Anything at least a day old is rejected, whatever it selected
    #[test]
    fn prop_stale_root_selection_rejected(
        tenant in proptest::option::of("biz-[a-z0-9]{1,8}"),
        show_all in any::<bool>(),
        age_minutes in (24 * 60i64)..(24 * 60 * 30),
    ) {
        let h = Harness::new();
        let root = root("session");
        let selection = TenantSelection {
            tenant_id: tenant.map(TenantId::new),
            show_all,
            selected_at: Utc::now() - Duration::minutes(age_minutes),
        };
        h.seed_selection(&root, &selection);

        prop_assert!(matches!(
            h.tenants.resolve_effective_tenant(&root),
            Err(AppError::TenantSelectionRequired)
        ));
    }
}
