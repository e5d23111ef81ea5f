//! Storage-layer failures.
//!
//! Constraint outcomes the caller must react to are lifted into dedicated
//! variants; everything else is an infrastructure failure.

use gatehouse_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("e-mail address already in use")]
    EmailInUse,

    #[error("user was not a member of the organization")]
    NoOrganizationsRemoved,

    #[error("stored row is corrupt: {0}")]
    CorruptRow(String),

    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("JSON column error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DbError {
    /// The business error this storage outcome stands for, if any.
    pub fn as_core(&self) -> Option<CoreError> {
        match self {
            DbError::EmailInUse => Some(CoreError::EmailInUse),
            DbError::NoOrganizationsRemoved => Some(CoreError::NoOrganizationsRemoved),
            _ => None,
        }
    }
}

/// Whether `err` is a unique-constraint violation on any backend.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            if db.is_unique_violation() {
                return true;
            }
            // The Any driver does not always forward the error kind.
            let message = db.message().to_ascii_lowercase();
            message.contains("unique") || message.contains("duplicate")
        }
        _ => false,
    }
}
