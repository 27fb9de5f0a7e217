//! Query result caching in Redis with per-table invalidation.
//!
//! Every cached read is stored under `query_cache:<sha256>` and its key is
//! added to a `table_cache:<table>` set for each table the SQL reads. A
//! write to a table deletes every key listed in that table's set, then the
//! set itself. A tag set never expires before the entries it lists, and an
//! entry that cannot be tagged is dropped. Redis failures are logged and
//! never fail the query.

use std::collections::BTreeSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::JsonValue;
use sha2::{Digest, Sha256};

use super::cache::CacheStore;
use crate::config::{CACHE_PREFIX_QUERY, CACHE_PREFIX_TABLE};
use crate::errors::AppResult;

/// One table reference: optional schema qualifier, optional identifier quotes.
const TABLE_REF: &str = r#"(?:[`"]?\w+[`"]?\.)?[`"]?(\w+)[`"]?"#;

/// Table named right after a clause keyword.
static TABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b(?:FROM|JOIN|UPDATE|INTO)\s+{}", TABLE_REF))
        .expect("table pattern is valid")
});

/// Comma-separated table list after FROM, each entry with an optional alias.
static TABLE_LIST_RE: Lazy<Regex> = Lazy::new(|| {
    let entry = r#"(?:[`"]?\w+[`"]?\.)?[`"]?\w+[`"]?(?:\s+(?:AS\s+)?\w+)?"#;
    Regex::new(&format!(
        r"(?i)\bFROM\s+({entry}(?:\s*,\s*{entry})+)",
        entry = entry
    ))
    .expect("table list pattern is valid")
});

static TABLE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^{}", TABLE_REF)).expect("table name pattern is valid")
});

/// Cache key for a query and a rendering of its parameters.
pub fn cache_key(query: &str, fingerprint: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.as_bytes());
    hasher.update(b":");
    hasher.update(fingerprint.as_bytes());
    format!("{}{}", CACHE_PREFIX_QUERY, hex::encode(hasher.finalize()))
}

/// Key of the set listing cached queries that read `table`.
pub fn table_key(table: &str) -> String {
    format!("{}{}", CACHE_PREFIX_TABLE, table)
}

/// Table names referenced after FROM, JOIN, UPDATE or INTO, including every
/// entry of a comma-separated FROM list, deduplicated and sorted. Schema
/// qualifiers, identifier quotes and aliases are stripped.
pub fn extract_tables(query: &str) -> Vec<String> {
    let leading = TABLE_RE
        .captures_iter(query)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    let listed = TABLE_LIST_RE
        .captures_iter(query)
        .filter_map(|caps| caps.get(1))
        .flat_map(|list| list.as_str().split(','))
        .filter_map(|item| TABLE_NAME_RE.captures(item.trim()))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    leading
        .chain(listed)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Query result cache bound to one Redis database.
#[derive(Clone)]
pub struct QueryCache {
    store: Arc<dyn CacheStore>,
    default_ttl: u64,
}

impl QueryCache {
    pub fn new(store: Arc<dyn CacheStore>, default_ttl: u64) -> Self {
        Self { store, default_ttl }
    }

    /// TTL applied when the caller does not pick one.
    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    /// Backing store, shared with the health check.
    pub fn store(&self) -> Arc<dyn CacheStore> {
        self.store.clone()
    }

    /// Cached rows for `key`, or `None` on a miss or a Redis failure.
    pub async fn lookup(&self, key: &str) -> Option<Vec<JsonValue>> {
        let raw = match self.store.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::error!(error = %e, "Failed to retrieve cached query result");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(rows) => Some(rows),
            Err(e) => {
                tracing::error!(error = %e, key, "Discarding unreadable cached query result");
                None
            }
        }
    }

    /// Store `rows` under `key` and tag the key with each table.
    pub async fn put(&self, key: &str, rows: &[JsonValue], tables: &[String], ttl: u64) {
        let payload = match serde_json::to_string(rows) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize query result");
                return;
            }
        };

        if let Err(e) = self.store.set_with_ttl(key, payload, ttl).await {
            tracing::error!(error = %e, "Failed to cache query result");
            return;
        }

        for table in tables {
            if let Err(e) = self.tag(&table_key(table), key, ttl).await {
                tracing::error!(error = %e, table = %table, "Failed to tag cached query");
                // an untagged entry would survive writes to the table
                if let Err(e) = self.store.delete_many(vec![key.to_string()]).await {
                    tracing::error!(error = %e, key, "Failed to drop untagged query result");
                }
                return;
            }
        }
        tracing::debug!(key, ?tables, "Cached query result");
    }

    /// Add `key` to the tag set, extending the set's lifetime to at least `ttl`.
    async fn tag(&self, set: &str, key: &str, ttl: u64) -> AppResult<()> {
        self.store.add_to_set(set, key).await?;

        let remaining = self.store.ttl(set).await?;
        if remaining.map_or(true, |remaining| remaining < ttl) {
            self.store.expire(set, ttl).await?;
        }
        Ok(())
    }

    /// Drop every cached query that reads `table`.
    pub async fn invalidate_table(&self, table: &str) {
        let set = table_key(table);

        let keys = match self.store.set_members(&set).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::error!(error = %e, table, "Failed to invalidate cache for table");
                return;
            }
        };
        if keys.is_empty() {
            return;
        }

        let count = keys.len();
        let mut doomed = keys;
        doomed.push(set);
        match self.store.delete_many(doomed).await {
            Ok(()) => tracing::info!(table, count, "Invalidated cache for table"),
            Err(e) => tracing::error!(error = %e, table, "Failed to invalidate cache for table"),
        }
    }
}
