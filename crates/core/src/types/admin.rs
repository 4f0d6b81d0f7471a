//! Admin users and roles.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{AdminUserId, IdentityUserId};

/// Permissions granted to every admin provisioned through the setup flow.
pub const DEFAULT_ADMIN_PERMISSIONS: &[&str] = &[
    "manage_products",
    "manage_blog",
    "manage_categories",
    "manage_banner",
    "manage_admins",
];

/// Admin role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Full access including admin management.
    SuperAdmin,
    /// Full access to store content.
    Admin,
    /// Read-only access.
    Viewer,
}

impl AdminRole {
    /// The role's database/wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Viewer => "viewer",
        }
    }
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name an [`AdminRole`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown admin role: {0}")]
pub struct AdminRoleParseError(pub String);

impl std::str::FromStr for AdminRole {
    type Err = AdminRoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "viewer" => Ok(Self::Viewer),
            other => Err(AdminRoleParseError(other.to_owned())),
        }
    }
}

/// A row of `admin_users`: grants a role to an identity-service user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: AdminUserId,
    /// The identity-service user this role belongs to.
    pub user_id: IdentityUserId,
    pub role: AdminRole,
    pub permissions: BTreeSet<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl AdminUser {
    /// Build a new active admin row with the default permission set.
    #[must_use]
    pub fn new_default(user_id: IdentityUserId, now: DateTime<Utc>) -> Self {
        Self {
            id: AdminUserId::generate(),
            user_id,
            role: AdminRole::Admin,
            permissions: DEFAULT_ADMIN_PERMISSIONS
                .iter()
                .map(|p| (*p).to_owned())
                .collect(),
            is_active: true,
            created_at: now,
        }
    }

    /// Whether this admin holds `permission`.
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.role == AdminRole::SuperAdmin || self.permissions.contains(permission)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [AdminRole::SuperAdmin, AdminRole::Admin, AdminRole::Viewer] {
            assert_eq!(role.as_str().parse::<AdminRole>().unwrap(), role);
        }
        assert!("owner".parse::<AdminRole>().is_err());
    }

    #[test]
    fn test_new_default_grants_fixed_permissions() {
        let admin = AdminUser::new_default(IdentityUserId::generate(), Utc::now());
        assert_eq!(admin.role, AdminRole::Admin);
        assert!(admin.is_active);
        assert_eq!(admin.permissions.len(), DEFAULT_ADMIN_PERMISSIONS.len());
        assert!(admin.has_permission("manage_blog"));
        assert!(!admin.has_permission("delete_store"));
    }

    #[test]
    fn test_super_admin_has_every_permission() {
        let mut admin = AdminUser::new_default(IdentityUserId::generate(), Utc::now());
        admin.role = AdminRole::SuperAdmin;
        admin.permissions.clear();
        assert!(admin.has_permission("anything"));
    }
}
