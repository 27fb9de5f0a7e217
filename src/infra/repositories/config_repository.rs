//! Configuration repository over the `app_config` table.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JsonValue, QueryFilter, QueryOrder, Set,
};

use super::entities::app_config::{self, ActiveModel, Entity as ConfigEntity};
use crate::config::TABLE_APP_CONFIG;
use crate::domain::{ConfigEntry, NewConfigEntry};
use crate::errors::{AppError, AppResult};
use crate::infra::{CachePolicy, Database};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// First value stored for a key. Served through the query cache.
const VALUE_BY_KEY_SQL: &str =
    "SELECT config_value FROM app_config WHERE config_key = ? ORDER BY config_id LIMIT 1";

/// Configuration repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ConfigRepository: Send + Sync {
    /// Insert a row; duplicate and absent keys are accepted
    async fn create(&self, entry: NewConfigEntry) -> AppResult<ConfigEntry>;

    /// Find entry by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<ConfigEntry>>;

    /// All entries with this key, ordered by ID
    async fn find_by_key(&self, key: &str) -> AppResult<Vec<ConfigEntry>>;

    /// Value of the first entry with this key
    async fn value_of(&self, key: &str) -> AppResult<Option<String>>;

    /// Replace the value, and the description when one is given
    async fn update_value(
        &self,
        id: i32,
        value: String,
        description: Option<String>,
    ) -> AppResult<ConfigEntry>;

    /// Delete every entry with this key, returning how many went
    async fn delete_by_key(&self, key: &str) -> AppResult<u64>;

    /// List all entries ordered by ID
    async fn list(&self) -> AppResult<Vec<ConfigEntry>>;
}

/// SeaORM-backed implementation of ConfigRepository
pub struct ConfigStore {
    db: Database,
}

impl ConfigStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn changed(&self) {
        self.db.invalidate_tables(&[TABLE_APP_CONFIG]).await;
    }
}

#[async_trait]
impl ConfigRepository for ConfigStore {
    async fn create(&self, entry: NewConfigEntry) -> AppResult<ConfigEntry> {
        let active_model = ActiveModel {
            config_key: Set(entry.key),
            config_value: Set(entry.value),
            description: Set(entry.description),
            ..Default::default()
        };

        let model = active_model
            .insert(self.db.connection())
            .await
            .map_err(AppError::from)?;
        self.changed().await;

        Ok(ConfigEntry::from(model))
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<ConfigEntry>> {
        let result = ConfigEntity::find_by_id(id)
            .one(self.db.connection())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(ConfigEntry::from))
    }

    async fn find_by_key(&self, key: &str) -> AppResult<Vec<ConfigEntry>> {
        let models = ConfigEntity::find()
            .filter(app_config::Column::ConfigKey.eq(key))
            .order_by_asc(app_config::Column::ConfigId)
            .all(self.db.connection())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(ConfigEntry::from).collect())
    }

    async fn value_of(&self, key: &str) -> AppResult<Option<String>> {
        let row = self
            .db
            .fetch_one(VALUE_BY_KEY_SQL, vec![key.into()], CachePolicy::Default)
            .await?;

        Ok(row
            .as_ref()
            .and_then(|r| r.get("config_value"))
            .and_then(JsonValue::as_str)
            .map(str::to_string))
    }

    async fn update_value(
        &self,
        id: i32,
        value: String,
        description: Option<String>,
    ) -> AppResult<ConfigEntry> {
        let entry = ConfigEntity::find_by_id(id)
            .one(self.db.connection())
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = entry.into();
        active.config_value = Set(Some(value));
        if let Some(description) = description {
            active.description = Set(Some(description));
        }

        let model = active
            .update(self.db.connection())
            .await
            .map_err(AppError::from)?;
        self.changed().await;

        Ok(ConfigEntry::from(model))
    }

    async fn delete_by_key(&self, key: &str) -> AppResult<u64> {
        let result = ConfigEntity::delete_many()
            .filter(app_config::Column::ConfigKey.eq(key))
            .exec(self.db.connection())
            .await
            .map_err(AppError::from)?;

        if result.rows_affected > 0 {
            self.changed().await;
        }
        Ok(result.rows_affected)
    }

    async fn list(&self) -> AppResult<Vec<ConfigEntry>> {
        let models = ConfigEntity::find()
            .order_by_asc(app_config::Column::ConfigId)
            .all(self.db.connection())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(ConfigEntry::from).collect())
    }
}
