//! Tenant selection made by privileged callers

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::TenantId;

/// Fixed key under which a session's selection is persisted
pub const SELECTION_STORAGE_KEY: &str = "root_selected_business";

/// How long a selection stays usable
pub const SELECTION_TTL_HOURS: i64 = 24;

/// A privileged caller's choice of which tenant(s) to work on.
///
/// Serialized as `{tenantId, showAll, timestamp}` with the timestamp in
/// epoch milliseconds. `{tenantId: null, showAll: false}` is the unset
/// state, which is never a valid selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSelection {
    pub tenant_id: Option<TenantId>,
    pub show_all: bool,
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub selected_at: DateTime<Utc>,
}

impl TenantSelection {
    pub fn single(tenant_id: TenantId, selected_at: DateTime<Utc>) -> Self {
        Self {
            tenant_id: Some(tenant_id),
            show_all: false,
            selected_at,
        }
    }

    pub fn all(selected_at: DateTime<Utc>) -> Self {
        Self {
            tenant_id: None,
            show_all: true,
            selected_at,
        }
    }

    pub fn unset(selected_at: DateTime<Utc>) -> Self {
        Self {
            tenant_id: None,
            show_all: false,
            selected_at,
        }
    }

    pub fn is_unset(&self) -> bool {
        !self.show_all && self.tenant_id.is_none()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.selected_at >= ttl
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        !self.is_unset() && !self.is_expired_at(now, ttl)
    }

    /// The scoping decision this selection stands for, if it is usable
    pub fn effective_at(&self, now: DateTime<Utc>, ttl: Duration) -> Option<EffectiveTenant> {
        if !self.is_valid_at(now, ttl) {
            return None;
        }
        match (&self.tenant_id, self.show_all) {
            (_, true) => Some(EffectiveTenant::All),
            (Some(tenant_id), false) => Some(EffectiveTenant::Single(tenant_id.clone())),
            (None, false) => None,
        }
    }
}

/// Resolved scoping decision for one query or write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "tenantId", rename_all = "snake_case")]
pub enum EffectiveTenant {
    Single(TenantId),
    All,
}

impl EffectiveTenant {
    pub fn tenant_id(&self) -> Option<&TenantId> {
        match self {
            EffectiveTenant::Single(tenant_id) => Some(tenant_id),
            EffectiveTenant::All => None,
        }
    }
}
