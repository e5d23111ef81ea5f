//! Repository for the `resetrequests` table (activation, reset and
//! one-time-login tokens).

use gatehouse_core::email_token::{EmailToken, TokenKind};
use gatehouse_core::types::{to_unix, DbId, Timestamp};

use crate::models::email_token::EmailTokenRow;
use crate::{DbError, DbPool, Dialect};

const COLUMNS: &str = "id, user_id, email, token, issued, kind";

struct Statements {
    insert: String,
    find: String,
    list_for_user: String,
    delete: String,
    delete_expired_for: String,
    purge_issued_before: String,
}

impl Statements {
    fn render(dialect: Dialect) -> Self {
        Self {
            insert: dialect.sql(
                "INSERT INTO resetrequests (user_id, email, token, issued, kind) \
                 VALUES (?, ?, ?, ?, ?)",
            ),
            find: dialect.sql(&format!(
                "SELECT {COLUMNS} FROM resetrequests \
                 WHERE user_id = ? AND token = ? AND kind = ?"
            )),
            list_for_user: dialect.sql(&format!(
                "SELECT {COLUMNS} FROM resetrequests \
                 WHERE user_id = ? AND kind = ? ORDER BY id"
            )),
            delete: dialect.sql("DELETE FROM resetrequests WHERE id = ?"),
            delete_expired_for: dialect.sql(
                "DELETE FROM resetrequests WHERE user_id = ? AND kind = ? AND issued <= ?",
            ),
            purge_issued_before: dialect.sql("DELETE FROM resetrequests WHERE issued <= ?"),
        }
    }
}

/// Stores issued e-mail tokens until they are used or expire.
pub struct EmailTokenRepo {
    pool: DbPool,
    sql: Statements,
}

impl EmailTokenRepo {
    pub fn new(pool: DbPool, dialect: Dialect) -> Self {
        Self {
            pool,
            sql: Statements::render(dialect),
        }
    }

    /// Persist a freshly issued token.
    pub async fn insert(
        &self,
        kind: TokenKind,
        user_id: DbId,
        email: &str,
        token: &str,
        issued: Timestamp,
    ) -> Result<(), DbError> {
        sqlx::query(&self.sql.insert)
            .bind(user_id)
            .bind(email)
            .bind(token)
            .bind(to_unix(issued))
            .bind(kind.as_i64())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Look up the row keyed by `(user_id, token, kind)`.
    pub async fn find(
        &self,
        kind: TokenKind,
        user_id: DbId,
        token: &str,
    ) -> Result<Option<EmailToken>, DbError> {
        let row = sqlx::query_as::<_, EmailTokenRow>(&self.sql.find)
            .bind(user_id)
            .bind(token)
            .bind(kind.as_i64())
            .fetch_optional(&self.pool)
            .await?;
        row.map(EmailToken::try_from).transpose()
    }

    /// Every outstanding token of `kind` for a user, oldest first.
    pub async fn list_for_user(
        &self,
        kind: TokenKind,
        user_id: DbId,
    ) -> Result<Vec<EmailToken>, DbError> {
        let rows = sqlx::query_as::<_, EmailTokenRow>(&self.sql.list_for_user)
            .bind(user_id)
            .bind(kind.as_i64())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(EmailToken::try_from).collect()
    }

    /// Delete a token row. Returns `true` if the row existed.
    pub async fn delete(&self, id: DbId) -> Result<bool, DbError> {
        let result = sqlx::query(&self.sql.delete)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user's rows of `kind` issued at or before `cutoff`.
    pub async fn delete_expired_for(
        &self,
        kind: TokenKind,
        user_id: DbId,
        cutoff: Timestamp,
    ) -> Result<u64, DbError> {
        let result = sqlx::query(&self.sql.delete_expired_for)
            .bind(user_id)
            .bind(kind.as_i64())
            .bind(to_unix(cutoff))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete every row issued at or before `cutoff`, regardless of kind.
    pub async fn purge_issued_before(&self, cutoff: Timestamp) -> Result<u64, DbError> {
        let result = sqlx::query(&self.sql.purge_issued_before)
            .bind(to_unix(cutoff))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
