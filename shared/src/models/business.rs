//! Business (tenant) models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::TenantId;

/// Collection holding the tenant directory
pub const BUSINESS_COLLECTION: &str = "businesses";

/// A registered business on the platform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub id: TenantId,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
