//! Repository for the `userpref` table.

use std::sync::Arc;

use gatehouse_core::preferences::{OptionGroup, SettingGroup};
use gatehouse_core::types::DbId;

use crate::{DbError, DbPool, Dialect};

/// Per-user settings, returned with the option schema's defaults merged in.
pub struct PreferenceRepo {
    pool: DbPool,
    schema: Arc<OptionGroup>,
    select: String,
    upsert: String,
}

impl PreferenceRepo {
    pub fn new(pool: DbPool, dialect: Dialect, schema: Arc<OptionGroup>) -> Self {
        Self {
            pool,
            schema,
            select: dialect.sql("SELECT settings FROM userpref WHERE user_id = ?"),
            upsert: dialect.upsert("userpref", "user_id", &["user_id", "settings"]),
        }
    }

    pub fn schema(&self) -> &OptionGroup {
        &self.schema
    }

    /// Stored settings for a user with every missing declared option filled
    /// from its default. A user without a row gets the defaults only.
    pub async fn get_preferences(&self, user_id: DbId) -> Result<SettingGroup, DbError> {
        let stored = sqlx::query_scalar::<_, String>(&self.select)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        let mut settings = match stored {
            Some(column) => SettingGroup::from_stored(&column)?,
            None => SettingGroup::default(),
        };
        self.schema.merge_defaults(&mut settings);
        Ok(settings)
    }

    /// Store `settings` as given. Defaults are not written.
    pub async fn set_preferences(
        &self,
        user_id: DbId,
        settings: &SettingGroup,
    ) -> Result<(), DbError> {
        sqlx::query(&self.upsert)
            .bind(user_id)
            .bind(settings.to_stored()?)
            .execute(&self.pool)
            .await?;
        tracing::debug!(user_id, "Preferences stored");
        Ok(())
    }
}
