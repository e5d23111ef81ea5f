//! Repository for the `users` and `user_organizations` tables.

use chrono::Utc;
use gatehouse_core::types::{to_unix, DbId};
use gatehouse_core::user::{normalize_email, normalize_organizations, NewUser, User};

use crate::error::is_unique_violation;
use crate::models::user::UserRow;
use crate::{DbError, DbPool, Dialect};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, password_hash, activation, extensions";

struct Statements {
    by_email: String,
    by_id: String,
    organizations: String,
    insert: String,
    update: String,
    activate: String,
    add_organization: String,
    remove_organization: String,
    list_all: String,
    list_active: String,
    list_in_org: String,
    list_active_in_org: String,
}

impl Statements {
    fn render(dialect: Dialect) -> Self {
        let list_in_org = "SELECT u.id FROM users u \
             JOIN user_organizations o ON o.user_id = u.id \
             WHERE o.org_id = ?";
        Self {
            by_email: dialect.sql(&format!("SELECT {COLUMNS} FROM users WHERE email = ?")),
            by_id: dialect.sql(&format!("SELECT {COLUMNS} FROM users WHERE id = ?")),
            organizations: dialect
                .sql("SELECT org_id FROM user_organizations WHERE user_id = ? ORDER BY org_id"),
            insert: dialect
                .sql("INSERT INTO users (email, password_hash, extensions) VALUES (?, ?, ?)"),
            update: dialect.sql(
                "UPDATE users SET email = ?, password_hash = ?, extensions = ? WHERE id = ?",
            ),
            activate: dialect
                .sql("UPDATE users SET activation = COALESCE(activation, ?) WHERE id = ?"),
            add_organization: dialect.sql(
                "INSERT INTO user_organizations (user_id, org_id, join_date) VALUES (?, ?, ?)",
            ),
            remove_organization: dialect
                .sql("DELETE FROM user_organizations WHERE user_id = ? AND org_id = ?"),
            list_all: "SELECT id FROM users ORDER BY id".to_string(),
            list_active: "SELECT id FROM users WHERE activation IS NOT NULL ORDER BY id"
                .to_string(),
            list_in_org: dialect.sql(&format!("{list_in_org} ORDER BY u.id")),
            list_active_in_org: dialect.sql(&format!(
                "{list_in_org} AND u.activation IS NOT NULL ORDER BY u.id"
            )),
        }
    }
}

/// Provides user lookups, writes and membership maintenance.
///
/// E-mail addresses are normalized on every write and lookup, so callers may
/// pass them as typed by the user.
pub struct UserRepo {
    pool: DbPool,
    sql: Statements,
}

impl UserRepo {
    pub fn new(pool: DbPool, dialect: Dialect) -> Self {
        Self {
            pool,
            sql: Statements::render(dialect),
        }
    }

    /// Find a user by e-mail (case- and whitespace-insensitive).
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let row = sqlx::query_as::<_, UserRow>(&self.sql.by_email)
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;
        self.hydrate(row).await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(&self, id: DbId) -> Result<Option<User>, DbError> {
        let row = sqlx::query_as::<_, UserRow>(&self.sql.by_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        self.hydrate(row).await
    }

    /// Organization ids the user belongs to, ascending.
    pub async fn organizations_of(&self, user_id: DbId) -> Result<Vec<DbId>, DbError> {
        let organizations = sqlx::query_scalar::<_, i64>(&self.sql.organizations)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(normalize_organizations(organizations))
    }

    /// Insert a new user and return it as stored (with its assigned id and
    /// no memberships).
    pub async fn add(&self, input: &NewUser) -> Result<User, DbError> {
        let email = normalize_email(&input.email);
        if self.find_by_email(&email).await?.is_some() {
            return Err(DbError::EmailInUse);
        }

        let extensions = encode_extensions(&input.extensions)?;
        sqlx::query(&self.sql.insert)
            .bind(&email)
            .bind(&input.password_hash)
            .bind(extensions)
            .execute(&self.pool)
            .await
            .map_err(unique_as_email_in_use)?;

        let user = self
            .find_by_email(&email)
            .await?
            .ok_or(DbError::Sqlx(sqlx::Error::RowNotFound))?;
        tracing::debug!(user_id = user.id, "User added");
        Ok(user)
    }

    /// Persist the e-mail, password hash and extensions of `user`.
    ///
    /// Never touches the id, the activation timestamp or memberships.
    /// Returns `false` if no row with the user's id exists.
    pub async fn update(&self, user: &User) -> Result<bool, DbError> {
        let extensions = encode_extensions(&user.extensions)?;
        let result = sqlx::query(&self.sql.update)
            .bind(normalize_email(&user.email))
            .bind(&user.password_hash)
            .bind(extensions)
            .bind(user.id)
            .execute(&self.pool)
            .await
            .map_err(unique_as_email_in_use)?;
        Ok(result.rows_affected() > 0)
    }

    /// Stamp the activation time. The first activation time is kept on repeat calls.
    pub async fn activate(&self, user_id: DbId) -> Result<(), DbError> {
        sqlx::query(&self.sql.activate)
            .bind(to_unix(Utc::now()))
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Add a membership edge. Adding an existing edge is a no-op.
    pub async fn add_to_organization(&self, user_id: DbId, org_id: DbId) -> Result<(), DbError> {
        let result = sqlx::query(&self.sql.add_organization)
            .bind(user_id)
            .bind(org_id)
            .bind(to_unix(Utc::now()))
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                tracing::debug!(user_id, org_id, "Membership already present");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Remove a membership edge; fails with [`DbError::NoOrganizationsRemoved`]
    /// if the edge did not exist.
    pub async fn remove_from_organization(
        &self,
        user_id: DbId,
        org_id: DbId,
    ) -> Result<(), DbError> {
        let result = sqlx::query(&self.sql.remove_organization)
            .bind(user_id)
            .bind(org_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NoOrganizationsRemoved);
        }
        Ok(())
    }

    /// List user ids, optionally restricted to activated users and/or one organization.
    pub async fn list(
        &self,
        only_active: bool,
        organization: Option<DbId>,
    ) -> Result<Vec<DbId>, DbError> {
        let query = match (only_active, organization) {
            (false, None) => sqlx::query_scalar::<_, i64>(&self.sql.list_all),
            (true, None) => sqlx::query_scalar::<_, i64>(&self.sql.list_active),
            (false, Some(org)) => sqlx::query_scalar::<_, i64>(&self.sql.list_in_org).bind(org),
            (true, Some(org)) => {
                sqlx::query_scalar::<_, i64>(&self.sql.list_active_in_org).bind(org)
            }
        };
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn hydrate(&self, row: Option<UserRow>) -> Result<Option<User>, DbError> {
        let Some(row) = row else {
            return Ok(None);
        };
        let organizations = self.organizations_of(row.id).await?;
        row.into_user(organizations).map(Some)
    }
}

fn encode_extensions(
    extensions: &gatehouse_core::user::Extensions,
) -> Result<Option<String>, DbError> {
    if extensions.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::to_string(extensions)?))
}

fn unique_as_email_in_use(err: sqlx::Error) -> DbError {
    if is_unique_violation(&err) {
        DbError::EmailInUse
    } else {
        DbError::Sqlx(err)
    }
}
