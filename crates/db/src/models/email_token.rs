//! Rows of the `resetrequests` table.

use gatehouse_core::email_token::{EmailToken, TokenKind};
use gatehouse_core::types::{from_unix, DbId};
use sqlx::FromRow;

use crate::DbError;

#[derive(Debug, Clone, FromRow)]
pub struct EmailTokenRow {
    pub id: DbId,
    pub user_id: DbId,
    pub email: String,
    pub token: String,
    /// Unix seconds.
    pub issued: i64,
    pub kind: i64,
}

impl TryFrom<EmailTokenRow> for EmailToken {
    type Error = DbError;

    fn try_from(row: EmailTokenRow) -> Result<Self, Self::Error> {
        let kind = TokenKind::from_i64(row.kind)
            .ok_or_else(|| DbError::CorruptRow(format!("resetrequests.kind = {}", row.kind)))?;
        let issued = from_unix(row.issued)
            .ok_or_else(|| DbError::CorruptRow(format!("resetrequests.issued = {}", row.issued)))?;
        Ok(EmailToken {
            id: row.id,
            user_id: row.user_id,
            email: row.email,
            token: row.token,
            issued,
            kind,
        })
    }
}
