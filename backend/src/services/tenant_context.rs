//! Tenant context resolution
//!
//! Decides which tenant a caller may query. Ordinary callers are pinned to
//! the business on their account. Privileged callers work on whatever they
//! explicitly selected for their browsing session: one business, or all of
//! them. A missing, unset or stale selection never widens to "all"; it
//! raises [`AppError::TenantSelectionRequired`] instead.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use shared::{EffectiveTenant, TenantId, TenantSelection, SELECTION_STORAGE_KEY};

use crate::error::{AppError, AppResult};
use crate::models::Caller;

/// Persistence port for session selections
pub trait SelectionStore: Send + Sync {
    fn load(&self, key: &str) -> AppResult<Option<String>>;
    fn save(&self, key: &str, value: String) -> AppResult<()>;
    fn clear(&self, key: &str) -> AppResult<()>;
}

/// Selections held in process memory, one serialized record per key
#[derive(Default)]
pub struct InMemorySelectionStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemorySelectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> AppError {
    AppError::Internal("selection store lock poisoned".to_string())
}

impl SelectionStore for InMemorySelectionStore {
    fn load(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.read().map_err(poisoned)?.get(key).cloned())
    }

    fn save(&self, key: &str, value: String) -> AppResult<()> {
        self.entries
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), value);
        Ok(())
    }

    fn clear(&self, key: &str) -> AppResult<()> {
        self.entries.write().map_err(poisoned)?.remove(key);
        Ok(())
    }
}

pub struct TenantContext {
    store: Arc<dyn SelectionStore>,
    ttl: Duration,
    storage_key: String,
}

impl TenantContext {
    pub fn new(store: Arc<dyn SelectionStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            storage_key: SELECTION_STORAGE_KEY.to_string(),
        }
    }

    pub fn with_storage_key(mut self, storage_key: impl Into<String>) -> Self {
        self.storage_key = storage_key.into();
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Storage key of the caller's browsing session
    pub fn session_key(&self, caller: &Caller) -> String {
        format!("{}:{}", self.storage_key, caller.session_id)
    }

    /// The persisted selection of the caller's session, if any
    pub fn current_selection(&self, caller: &Caller) -> AppResult<Option<TenantSelection>> {
        let Some(raw) = self.store.load(&self.session_key(caller))? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(selection) => Ok(Some(selection)),
            Err(e) => {
                tracing::warn!(session = %caller.session_id, "Discarding unreadable tenant selection: {}", e);
                Ok(None)
            }
        }
    }

    pub fn resolve_effective_tenant(&self, caller: &Caller) -> AppResult<EffectiveTenant> {
        self.resolve_at(caller, Utc::now())
    }

    pub fn resolve_at(&self, caller: &Caller, now: DateTime<Utc>) -> AppResult<EffectiveTenant> {
        if !caller.is_privileged() {
            return caller
                .assigned_tenant_id
                .clone()
                .map(EffectiveTenant::Single)
                .ok_or(AppError::NoTenantContext);
        }

        let effective = self
            .current_selection(caller)?
            .and_then(|selection| selection.effective_at(now, self.ttl));

        match effective {
            Some(effective) => {
                tracing::debug!(user_id = %caller.user_id, ?effective, "Resolved privileged tenant scope");
                Ok(effective)
            }
            None => {
                tracing::debug!(user_id = %caller.user_id, "Privileged caller has no valid tenant selection");
                Err(AppError::TenantSelectionRequired)
            }
        }
    }

    /// Persist a privileged caller's selection, stamped with the current time.
    ///
    /// `(None, false)` selects nothing and leaves the stored state untouched.
    pub fn set_selection(
        &self,
        caller: &Caller,
        tenant_id: Option<TenantId>,
        show_all: bool,
    ) -> AppResult<()> {
        self.set_selection_at(caller, tenant_id, show_all, Utc::now())
    }

    pub fn set_selection_at(
        &self,
        caller: &Caller,
        tenant_id: Option<TenantId>,
        show_all: bool,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        if !caller.is_privileged() {
            tracing::warn!(user_id = %caller.user_id, "Non-privileged caller attempted a tenant selection");
            return Err(AppError::Forbidden(
                "Only platform administrators can select a business".to_string(),
            ));
        }

        let selection = match (tenant_id, show_all) {
            (None, false) => {
                tracing::debug!(user_id = %caller.user_id, "Ignoring empty tenant selection");
                return Ok(());
            }
            (Some(_), true) => {
                return Err(AppError::validation(
                    "showAll",
                    "Choose either one business or all businesses",
                    "Elige un negocio o todos los negocios",
                ))
            }
            (Some(tenant_id), false) => TenantSelection::single(tenant_id, now),
            (None, true) => TenantSelection::all(now),
        };

        let raw = serde_json::to_string(&selection)
            .map_err(|e| AppError::Internal(format!("serialize selection: {}", e)))?;
        self.store.save(&self.session_key(caller), raw)?;

        tracing::info!(
            user_id = %caller.user_id,
            tenant_id = ?selection.tenant_id,
            show_all = selection.show_all,
            "Tenant selection updated"
        );
        Ok(())
    }

    /// Reset the session to the unset state
    pub fn clear_selection(&self, caller: &Caller) -> AppResult<()> {
        self.store.clear(&self.session_key(caller))?;
        tracing::debug!(session = %caller.session_id, "Tenant selection cleared");
        Ok(())
    }

    pub fn is_selection_valid(&self, caller: &Caller) -> AppResult<bool> {
        self.is_selection_valid_at(caller, Utc::now())
    }

    pub fn is_selection_valid_at(&self, caller: &Caller, now: DateTime<Utc>) -> AppResult<bool> {
        if !caller.is_privileged() {
            return Ok(true);
        }
        Ok(self
            .current_selection(caller)?
            .map(|selection| selection.is_valid_at(now, self.ttl))
            .unwrap_or(false))
    }
}
