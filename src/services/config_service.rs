//! Configuration service - key/value settings in `app_config`.
//!
//! Keys may repeat in the table. Reads and updates resolve a key to its
//! first row (lowest `config_id`); `add_entry` inserts unconditionally.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::MAX_IDENTIFIER_LENGTH;
use crate::domain::{ConfigEntry, NewConfigEntry};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::ConfigRepository;

/// Configuration service trait for dependency injection.
#[async_trait]
pub trait ConfigService: Send + Sync {
    /// Value of the first entry with this key
    async fn get(&self, key: &str) -> AppResult<String>;

    /// Update the first entry with this key, or insert one
    async fn set(
        &self,
        key: &str,
        value: String,
        description: Option<String>,
    ) -> AppResult<ConfigEntry>;

    /// Remove every entry with this key
    async fn unset(&self, key: &str) -> AppResult<u64>;

    /// List all entries
    async fn list(&self) -> AppResult<Vec<ConfigEntry>>;

    /// Insert a raw row, duplicates and empty keys included
    async fn add_entry(&self, entry: NewConfigEntry) -> AppResult<ConfigEntry>;
}

/// Concrete implementation of ConfigService.
pub struct ConfigManager {
    entries: Arc<dyn ConfigRepository>,
}

impl ConfigManager {
    pub fn new(entries: Arc<dyn ConfigRepository>) -> Self {
        Self { entries }
    }
}

fn validate_key(key: &str) -> AppResult<()> {
    if key.trim().is_empty() {
        return Err(AppError::validation("Configuration key must not be empty"));
    }
    if key.chars().count() > MAX_IDENTIFIER_LENGTH {
        return Err(AppError::validation(format!(
            "Configuration key must be at most {} characters",
            MAX_IDENTIFIER_LENGTH
        )));
    }
    Ok(())
}

#[async_trait]
impl ConfigService for ConfigManager {
    async fn get(&self, key: &str) -> AppResult<String> {
        self.entries.value_of(key).await?.ok_or_not_found()
    }

    async fn set(
        &self,
        key: &str,
        value: String,
        description: Option<String>,
    ) -> AppResult<ConfigEntry> {
        validate_key(key)?;

        let first = self.entries.find_by_key(key).await?.into_iter().next();
        let entry = match first {
            Some(entry) => {
                self.entries
                    .update_value(entry.id, value, description)
                    .await?
            }
            None => {
                self.entries
                    .create(NewConfigEntry {
                        key: Some(key.to_string()),
                        value: Some(value),
                        description,
                    })
                    .await?
            }
        };

        tracing::info!(config_id = entry.id, key, "Configuration entry set");
        Ok(entry)
    }

    async fn unset(&self, key: &str) -> AppResult<u64> {
        let removed = self.entries.delete_by_key(key).await?;
        if removed == 0 {
            return Err(AppError::NotFound);
        }

        tracing::info!(key, removed, "Configuration entries removed");
        Ok(removed)
    }

    async fn list(&self) -> AppResult<Vec<ConfigEntry>> {
        self.entries.list().await
    }

    async fn add_entry(&self, entry: NewConfigEntry) -> AppResult<ConfigEntry> {
        if let Some(key) = &entry.key {
            if key.chars().count() > MAX_IDENTIFIER_LENGTH {
                return Err(AppError::validation(format!(
                    "Configuration key must be at most {} characters",
                    MAX_IDENTIFIER_LENGTH
                )));
            }
        }
        self.entries.create(entry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::MockConfigRepository;

    fn entry(id: i32, key: &str, value: &str) -> ConfigEntry {
        ConfigEntry {
            id,
            key: Some(key.to_string()),
            value: Some(value.to_string()),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let mut repo = MockConfigRepository::new();
        repo.expect_value_of().returning(|_| Ok(None));

        let service = ConfigManager::new(Arc::new(repo));
        assert!(matches!(
            service.get("cad.poll_interval").await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_set_inserts_when_absent() {
        let mut repo = MockConfigRepository::new();
        repo.expect_find_by_key().returning(|_| Ok(Vec::new()));
        repo.expect_update_value().never();
        repo.expect_create()
            .withf(|new| {
                new.key.as_deref() == Some("cad.poll_interval")
                    && new.value.as_deref() == Some("30")
                    && new.description.as_deref() == Some("seconds")
            })
            .times(1)
            .returning(|_| Ok(entry(1, "cad.poll_interval", "30")));

        let service = ConfigManager::new(Arc::new(repo));
        let created = service
            .set("cad.poll_interval", "30".to_string(), Some("seconds".to_string()))
            .await
            .unwrap();

        assert_eq!(created.id, 1);
    }

    #[tokio::test]
    async fn test_set_updates_first_match() {
        let mut repo = MockConfigRepository::new();
        repo.expect_find_by_key().returning(|key| {
            Ok(vec![entry(3, key, "old"), entry(8, key, "older")])
        });
        repo.expect_create().never();
        repo.expect_update_value()
            .withf(|id, value, description| *id == 3 && value == "new" && description.is_none())
            .times(1)
            .returning(|id, value, _| Ok(entry(id, "cad.region", &value)));

        let service = ConfigManager::new(Arc::new(repo));
        let updated = service
            .set("cad.region", "new".to_string(), None)
            .await
            .unwrap();

        assert_eq!(updated.id, 3);
        assert_eq!(updated.value.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_set_rejects_empty_key() {
        let repo = MockConfigRepository::new();
        let service = ConfigManager::new(Arc::new(repo));

        let result = service.set("", "v".to_string(), None).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unset_missing_key() {
        let mut repo = MockConfigRepository::new();
        repo.expect_delete_by_key().returning(|_| Ok(0));

        let service = ConfigManager::new(Arc::new(repo));
        assert!(matches!(
            service.unset("nope").await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_add_entry_allows_empty_row() {
        let mut repo = MockConfigRepository::new();
        repo.expect_create()
            .withf(|new| new.key.is_none() && new.value.is_none())
            .times(1)
            .returning(|_| {
                Ok(ConfigEntry {
                    id: 5,
                    key: None,
                    value: None,
                    description: None,
                })
            });

        let service = ConfigManager::new(Arc::new(repo));
        let created = service.add_entry(NewConfigEntry::default()).await.unwrap();
        assert_eq!(created.id, 5);
    }
}
