//! Contract shared by every tenant-owned document

use serde::{de::DeserializeOwned, Serialize};

use crate::types::TenantId;

/// A persisted entity that belongs to exactly one tenant and is soft-deleted
/// through its `isActive` flag.
pub trait ScopedEntity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name in the document store
    const COLLECTION: &'static str;

    /// Human readable label used in error messages
    const LABEL: &'static str;

    /// Field used for the default ascending sort
    const DISPLAY_NAME_FIELD: &'static str = "name";

    /// Fields callers are allowed to sort by
    const SORTABLE_FIELDS: &'static [&'static str];

    fn id(&self) -> &str;

    fn tenant_id(&self) -> &TenantId;

    fn is_active(&self) -> bool;
}
