//! Repository for the `roles` table: per-organization role assignments.

use std::collections::BTreeSet;
use std::sync::Arc;

use gatehouse_core::permissions::{PermissionTable, Permissions};
use gatehouse_core::types::DbId;

use crate::models::role::RolesUpdate;
use crate::{DbError, DbPool, Dialect};

struct Statements {
    role_ids: String,
    clear: String,
    insert: String,
}

impl Statements {
    fn render(dialect: Dialect) -> Self {
        Self {
            role_ids: dialect
                .sql("SELECT role_id FROM roles WHERE user_id = ? AND org_id = ? ORDER BY role_id"),
            clear: dialect.sql("DELETE FROM roles WHERE user_id = ? AND org_id = ?"),
            insert: dialect.sql("INSERT INTO roles (user_id, org_id, role_id) VALUES (?, ?, ?)"),
        }
    }
}

/// Reads and replaces role assignments, resolving them through the
/// process-wide [`PermissionTable`].
pub struct RoleRepo {
    pool: DbPool,
    table: Arc<PermissionTable>,
    sql: Statements,
}

impl RoleRepo {
    pub fn new(pool: DbPool, dialect: Dialect, table: Arc<PermissionTable>) -> Self {
        Self {
            pool,
            table,
            sql: Statements::render(dialect),
        }
    }

    pub fn table(&self) -> &PermissionTable {
        &self.table
    }

    /// Role ids assigned to `(user_id, org_id)`, ascending.
    pub async fn get_role_ids(&self, user_id: DbId, org_id: DbId) -> Result<Vec<DbId>, DbError> {
        Ok(sqlx::query_scalar::<_, i64>(&self.sql.role_ids)
            .bind(user_id)
            .bind(org_id)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Permissions granted by every role assigned to `(user_id, org_id)`.
    pub async fn get_permissions(
        &self,
        user_id: DbId,
        org_id: DbId,
    ) -> Result<Permissions, DbError> {
        let role_ids = self.get_role_ids(user_id, org_id).await?;
        Ok(self.table.permissions_for(&role_ids))
    }

    /// Replace the assignment for `(user_id, org_id)` with `roles`.
    ///
    /// Order and duplicates in `roles` are ignored. When the new set equals
    /// the stored one nothing is written; otherwise the old rows are deleted
    /// and the new ones inserted in one transaction.
    pub async fn set_roles_by_role_id(
        &self,
        user_id: DbId,
        org_id: DbId,
        roles: &[DbId],
    ) -> Result<RolesUpdate, DbError> {
        let wanted: BTreeSet<DbId> = roles.iter().copied().collect();

        let mut tx = self.pool.begin().await?;

        let current: BTreeSet<DbId> = sqlx::query_scalar::<_, i64>(&self.sql.role_ids)
            .bind(user_id)
            .bind(org_id)
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .collect();

        if current == wanted {
            tx.commit().await?;
            return Ok(RolesUpdate::default());
        }

        let cleared = sqlx::query(&self.sql.clear)
            .bind(user_id)
            .bind(org_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        for role_id in &wanted {
            sqlx::query(&self.sql.insert)
                .bind(user_id)
                .bind(org_id)
                .bind(*role_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(user_id, org_id, roles = ?wanted, "Roles replaced");
        Ok(RolesUpdate {
            cleared,
            inserted: wanted.len(),
        })
    }

    /// Resolve role names through the permission table, then replace the
    /// assignment. Unknown names are dropped.
    pub async fn set_roles_by_name(
        &self,
        user_id: DbId,
        org_id: DbId,
        names: &[String],
    ) -> Result<RolesUpdate, DbError> {
        let mut role_ids = Vec::with_capacity(names.len());
        for name in names {
            match self.table.lookup_role_id(name) {
                Some(id) => role_ids.push(id),
                None => tracing::warn!(user_id, org_id, role = %name, "Ignoring unknown role name"),
            }
        }
        self.set_roles_by_role_id(user_id, org_id, &role_ids).await
    }
}
