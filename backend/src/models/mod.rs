//! Request-scoped models for the inventory platform
//!
//! Re-exports models from the shared crate and adds backend-specific models

pub use shared::models::*;

use shared::TenantId;

use crate::error::{AppError, AppResult};

/// The authenticated principal behind a request
#[derive(Clone, Debug)]
pub struct Caller {
    pub user_id: String,
    pub permissions: PermissionSet,
    /// Business the account belongs to; absent for platform-level accounts
    pub assigned_tenant_id: Option<TenantId>,
    /// Browsing session the request belongs to
    pub session_id: String,
}

impl Caller {
    pub fn new(
        user_id: impl Into<String>,
        permissions: PermissionSet,
        assigned_tenant_id: Option<TenantId>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            permissions,
            assigned_tenant_id,
            session_id: session_id.into(),
        }
    }

    pub fn is_privileged(&self) -> bool {
        self.permissions.is_privileged()
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.permissions.can(permission)
    }

    /// Permission guard for use in services
    pub fn require(&self, permission: Permission) -> AppResult<()> {
        if self.can(permission) {
            Ok(())
        } else {
            tracing::warn!(
                user_id = %self.user_id,
                ?permission,
                "Permission denied"
            );
            Err(AppError::InsufficientPermissions)
        }
    }
}
