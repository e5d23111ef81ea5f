//! The user record and e-mail normalization rules.

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Open mapping for profile attributes beyond the identity fields.
pub type Extensions = serde_json::Map<String, serde_json::Value>;

/// A stored user together with its organization memberships.
///
/// Contains the password hash -- never serialize this type into a response.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: DbId,
    /// Always trimmed and lower-cased.
    pub email: String,
    /// bcrypt hash; empty means password login is disabled.
    pub password_hash: String,
    pub activation: Option<Timestamp>,
    /// Sorted, de-duplicated organization ids.
    pub organizations: Vec<DbId>,
    pub extensions: Extensions,
}

impl User {
    pub fn password_login(&self) -> bool {
        !self.password_hash.is_empty()
    }

    pub fn activated(&self) -> bool {
        self.activation.is_some()
    }

    pub fn is_member_of(&self, organization_id: DbId) -> bool {
        self.organizations.binary_search(&organization_id).is_ok()
    }

    /// Whether `email` names this user under case/whitespace folding.
    pub fn has_email(&self, email: &str) -> bool {
        self.email == normalize_email(email)
    }
}

/// Input for creating a user. `password_hash` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub extensions: Extensions,
}

/// Trim and lower-case an e-mail address for storage and comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// The only structural rule enforced on e-mail addresses.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if email.trim().contains('@') {
        Ok(())
    } else {
        Err(CoreError::MissingEmail)
    }
}

/// Sort and de-duplicate an organization list.
pub fn normalize_organizations(mut organizations: Vec<DbId>) -> Vec<DbId> {
    organizations.sort_unstable();
    organizations.dedup();
    organizations
}
