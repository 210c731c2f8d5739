//! Roles and the permission sets they grant
//!
//! The four platform roles are fixed and form a strict chain:
//! `root` ⊃ `admin` ⊃ `manager` ⊃ `operator`. Call sites ask for a
//! capability, never for a role name.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// The fixed platform roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleId {
    Root,
    Admin,
    Manager,
    Operator,
}

impl RoleId {
    pub const ALL: [RoleId; 4] = [RoleId::Root, RoleId::Admin, RoleId::Manager, RoleId::Operator];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleId::Root => "root",
            RoleId::Admin => "admin",
            RoleId::Manager => "manager",
            RoleId::Operator => "operator",
        }
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "root" => Ok(RoleId::Root),
            "admin" => Ok(RoleId::Admin),
            "manager" => Ok(RoleId::Manager),
            "operator" => Ok(RoleId::Operator),
            other => Err(DomainError::UnknownRole(other.to_string())),
        }
    }
}

/// Named capabilities a role may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewInventory,
    AdjustStock,
    ManageProducts,
    ManageCategories,
    ManageWarehouses,
    ManageUsers,
    ManageSettings,
    ManageBusinesses,
    /// Query and impersonate across tenants
    BypassTenantScope,
}

/// Permission set expressed as named booleans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PermissionSet {
    pub view_inventory: bool,
    pub adjust_stock: bool,
    pub manage_products: bool,
    pub manage_categories: bool,
    pub manage_warehouses: bool,
    pub manage_users: bool,
    pub manage_settings: bool,
    pub manage_businesses: bool,
    pub bypass_tenant_scope: bool,
}

impl PermissionSet {
    /// The set granted to unknown or unresolvable roles
    pub fn most_restrictive() -> Self {
        Self::default()
    }

    pub fn can(&self, permission: Permission) -> bool {
        match permission {
            Permission::ViewInventory => self.view_inventory,
            Permission::AdjustStock => self.adjust_stock,
            Permission::ManageProducts => self.manage_products,
            Permission::ManageCategories => self.manage_categories,
            Permission::ManageWarehouses => self.manage_warehouses,
            Permission::ManageUsers => self.manage_users,
            Permission::ManageSettings => self.manage_settings,
            Permission::ManageBusinesses => self.manage_businesses,
            Permission::BypassTenantScope => self.bypass_tenant_scope,
        }
    }

    pub fn is_privileged(&self) -> bool {
        self.bypass_tenant_scope
    }

    /// True when every permission in `other` is also granted here
    pub fn is_superset_of(&self, other: &PermissionSet) -> bool {
        ALL_PERMISSIONS
            .iter()
            .all(|p| !other.can(*p) || self.can(*p))
    }

    pub fn granted(&self) -> Vec<Permission> {
        ALL_PERMISSIONS.iter().copied().filter(|p| self.can(*p)).collect()
    }
}

pub const ALL_PERMISSIONS: [Permission; 9] = [
    Permission::ViewInventory,
    Permission::AdjustStock,
    Permission::ManageProducts,
    Permission::ManageCategories,
    Permission::ManageWarehouses,
    Permission::ManageUsers,
    Permission::ManageSettings,
    Permission::ManageBusinesses,
    Permission::BypassTenantScope,
];

fn operator_permissions() -> PermissionSet {
    PermissionSet {
        view_inventory: true,
        adjust_stock: true,
        ..PermissionSet::default()
    }
}

fn manager_permissions() -> PermissionSet {
    PermissionSet {
        manage_products: true,
        manage_categories: true,
        manage_warehouses: true,
        ..operator_permissions()
    }
}

fn admin_permissions() -> PermissionSet {
    PermissionSet {
        manage_users: true,
        manage_settings: true,
        ..manager_permissions()
    }
}

fn root_permissions() -> PermissionSet {
    PermissionSet {
        manage_businesses: true,
        bypass_tenant_scope: true,
        ..admin_permissions()
    }
}

/// Static role → permission lookup, built once at startup
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    roles: HashMap<RoleId, PermissionSet>,
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RoleRegistry {
    pub fn new() -> Self {
        let roles = HashMap::from([
            (RoleId::Root, root_permissions()),
            (RoleId::Admin, admin_permissions()),
            (RoleId::Manager, manager_permissions()),
            (RoleId::Operator, operator_permissions()),
        ]);
        Self { roles }
    }

    /// Permissions of a role id, failing for ids outside the fixed roles
    pub fn permissions_of(&self, role_id: &str) -> Result<PermissionSet, DomainError> {
        let role: RoleId = role_id.parse()?;
        Ok(self.permissions_for(role))
    }

    pub fn permissions_for(&self, role: RoleId) -> PermissionSet {
        self.roles.get(&role).copied().unwrap_or_default()
    }

    /// Like [`permissions_of`](Self::permissions_of) but falls back to the
    /// most restrictive set instead of failing
    pub fn permissions_or_restrictive(&self, role_id: &str) -> PermissionSet {
        self.permissions_of(role_id)
            .unwrap_or_else(|_| PermissionSet::most_restrictive())
    }

    pub fn can_manage(&self, role_id: &str, permission: Permission) -> bool {
        self.permissions_or_restrictive(role_id).can(permission)
    }
}
