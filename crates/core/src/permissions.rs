//! Static role → permission table and the aggregated permission set.
//!
//! The table is loaded once from a JSON document of the form
//!
//! ```json
//! { "1": { "name": "admin", "permissions": ["users.list", "roles.write"] } }
//! ```
//!
//! and is read-only afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Permission names used by the HTTP surface
// ---------------------------------------------------------------------------

pub const PERMISSION_LIST_USERS: &str = "users.list";
pub const PERMISSION_MANAGE_USERS: &str = "users.manage";
pub const PERMISSION_READ_ROLES: &str = "roles.read";
pub const PERMISSION_WRITE_ROLES: &str = "roles.write";

// ---------------------------------------------------------------------------
// Permission table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionTable {
    roles: BTreeMap<DbId, RoleDefinition>,
}

impl PermissionTable {
    pub fn from_json(document: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(document)
    }

    pub fn role(&self, role_id: DbId) -> Option<&RoleDefinition> {
        self.roles.get(&role_id)
    }

    /// Case-insensitive lookup of a role id by its name.
    pub fn lookup_role_id(&self, name: &str) -> Option<DbId> {
        let wanted = name.trim();
        self.roles
            .iter()
            .find(|(_, role)| role.name.eq_ignore_ascii_case(wanted))
            .map(|(id, _)| *id)
    }

    /// Concatenate the permissions of every listed role. Unknown ids contribute nothing.
    pub fn permissions_for(&self, role_ids: &[DbId]) -> Permissions {
        let granted = role_ids
            .iter()
            .filter_map(|id| self.roles.get(id))
            .flat_map(|role| role.permissions.iter().cloned())
            .collect();
        Permissions(granted)
    }
}

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

/// Permission strings granted to one (user, organization) pair.
///
/// May contain duplicates; order is unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(pub Vec<String>);

impl Permissions {
    /// True iff every task is granted. An empty task list is always allowed.
    pub fn allowed_to(&self, tasks: &[&str]) -> bool {
        tasks.iter().all(|task| self.0.iter().any(|p| p == task))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PermissionTable {
        PermissionTable::from_json(
            r#"{
                "1": { "name": "Admin", "permissions": ["users.list", "roles.write"] },
                "2": { "name": "viewer", "permissions": ["users.list"] },
                "3": { "name": "empty" }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn role_names_resolve_case_insensitively() {
        let t = table();
        assert_eq!(t.lookup_role_id("admin"), Some(1));
        assert_eq!(t.lookup_role_id("VIEWER"), Some(2));
        assert_eq!(t.lookup_role_id("ghost"), None);
    }

    #[test]
    fn permissions_concatenate_with_duplicates() {
        let perms = table().permissions_for(&[1, 2, 3, 99]);
        assert_eq!(perms.as_slice().len(), 3);
        assert!(perms.allowed_to(&["users.list", "roles.write"]));
    }

    #[test]
    fn allowed_to_requires_every_task() {
        let perms = table().permissions_for(&[2]);
        assert!(perms.allowed_to(&["users.list"]));
        assert!(!perms.allowed_to(&["users.list", "roles.write"]));
        assert!(perms.allowed_to(&[]));
    }

    #[test]
    fn missing_permissions_field_defaults_to_empty() {
        let t = table();
        assert!(t.role(3).unwrap().permissions.is_empty());
    }
}
