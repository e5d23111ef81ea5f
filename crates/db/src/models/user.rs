//! User rows and the client-facing user representation.

use gatehouse_core::types::{from_unix, DbId};
use gatehouse_core::user::{Extensions, User};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

use crate::DbError;

/// Raw row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    /// Unix seconds.
    pub activation: Option<i64>,
    /// JSON object text.
    pub extensions: Option<String>,
}

impl UserRow {
    /// Attach the membership set and decode the stored columns.
    pub fn into_user(self, organizations: Vec<DbId>) -> Result<User, DbError> {
        let activation = match self.activation {
            Some(secs) => Some(from_unix(secs).ok_or_else(|| {
                DbError::CorruptRow(format!("users.activation = {secs} for user {}", self.id))
            })?),
            None => None,
        };

        let extensions = match self.extensions.as_deref().map(str::trim) {
            None | Some("") => Extensions::new(),
            Some(raw) => match serde_json::from_str::<Value>(raw)? {
                Value::Object(map) => map,
                _ => Extensions::new(),
            },
        };

        Ok(User {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            activation,
            organizations,
            extensions,
        })
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: DbId,
    pub email: String,
    pub organizations: Vec<DbId>,
    pub activated: bool,
    pub password_login: bool,
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
    /// Session token, present only on login responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl UserResponse {
    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            organizations: user.organizations.clone(),
            activated: user.activated(),
            password_login: user.password_login(),
            extensions: user.extensions.clone(),
            token: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(extensions: Option<&str>) -> UserRow {
        UserRow {
            id: 5,
            email: "a@b.com".into(),
            password_hash: "$2b$04$hash".into(),
            activation: Some(1_700_000_000),
            extensions: extensions.map(str::to_string),
        }
    }

    #[test]
    fn row_decodes_activation_and_extensions() {
        let user = row(Some(r#"{"name":"Ann"}"#)).into_user(vec![7]).unwrap();
        assert!(user.activated());
        assert_eq!(user.extensions["name"], "Ann");
        assert_eq!(user.organizations, vec![7]);
    }

    #[test]
    fn non_object_extensions_decode_as_empty() {
        let user = row(Some("null")).into_user(vec![]).unwrap();
        assert!(user.extensions.is_empty());
        let user = row(None).into_user(vec![]).unwrap();
        assert!(user.extensions.is_empty());
    }

    #[test]
    fn response_never_carries_the_hash() {
        let user = row(None).into_user(vec![7]).unwrap();
        let json = serde_json::to_value(UserResponse::from(&user)).unwrap();

        assert_eq!(json["passwordLogin"], true);
        assert_eq!(json["activated"], true);
        assert!(json.get("token").is_none());
        assert!(json.get("extensions").is_none());
        assert!(!json.to_string().contains("$2b$"));
    }
}
