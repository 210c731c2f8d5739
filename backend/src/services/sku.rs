//! Session SKU counters

use std::collections::HashMap;
use std::sync::Mutex;

use shared::{ClassificationAttributes, LocationContext, SkuCode, SkuCounter, TenantId};

use crate::error::{AppError, AppResult};
use crate::models::Caller;

/// One monotonic counter per browsing session.
///
/// Codes are only unique within a session; callers check the store for
/// collisions, advance the counter past what is taken and ask again.
#[derive(Default)]
pub struct SkuService {
    counters: Mutex<HashMap<String, SkuCounter>>,
}

impl SkuService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the next code for the caller's session
    pub fn generate(
        &self,
        caller: &Caller,
        tenant: &TenantId,
        location: &LocationContext,
        attributes: &ClassificationAttributes,
    ) -> AppResult<SkuCode> {
        let mut counters = self
            .counters
            .lock()
            .map_err(|_| AppError::Internal("sku counter lock poisoned".to_string()))?;
        let counter = counters.entry(caller.session_id.clone()).or_default();
        let code = counter.generate(Some(tenant), Some(location), attributes)?;

        tracing::debug!(session = %caller.session_id, sku = %code, "Generated SKU");
        Ok(code)
    }

    /// Sequence the session's next code will use
    pub fn next_sequence(&self, caller: &Caller) -> AppResult<u32> {
        let counters = self
            .counters
            .lock()
            .map_err(|_| AppError::Internal("sku counter lock poisoned".to_string()))?;
        Ok(counters
            .get(&caller.session_id)
            .map(SkuCounter::peek)
            .unwrap_or(1))
    }

    /// Skip the session past a sequence already taken in the store
    pub fn advance_past(&self, caller: &Caller, taken: u32) -> AppResult<()> {
        self.counters
            .lock()
            .map_err(|_| AppError::Internal("sku counter lock poisoned".to_string()))?
            .entry(caller.session_id.clone())
            .or_default()
            .advance_past(taken);
        Ok(())
    }

    /// Forget the session's counter (logout)
    pub fn end_session(&self, caller: &Caller) -> AppResult<()> {
        self.counters
            .lock()
            .map_err(|_| AppError::Internal("sku counter lock poisoned".to_string()))?
            .remove(&caller.session_id);
        Ok(())
    }
}
