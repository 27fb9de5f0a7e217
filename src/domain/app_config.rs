//! Key/value configuration entry (`app_config` row).

use serde::{Deserialize, Serialize};

/// Generic configuration entry. Key and value are both optional and keys
/// are not unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub id: i32,
    pub key: Option<String>,
    pub value: Option<String>,
    pub description: Option<String>,
}

/// Fields for inserting a new configuration row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewConfigEntry {
    pub key: Option<String>,
    pub value: Option<String>,
    pub description: Option<String>,
}

impl NewConfigEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            value: Some(value.into()),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
