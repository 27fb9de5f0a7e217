//! Query cache behaviour of `Database::fetch` and the repository writes.
//!
//! Runs against an in-memory cache store; `test_redis_round_trip` also runs
//! against a real server when `REDIS_URL` is set.

mod common;

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use icad_dispatch::domain::NewConfigEntry;
use icad_dispatch::errors::{AppError, AppResult};
use icad_dispatch::infra::{
    Cache, CachePolicy, CacheStore, ConfigRepository, ConfigStore, Database, FetchMode,
    QueryCache,
};

// =============================================================================
// In-memory cache store
// =============================================================================

#[derive(Default)]
struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    sets: Mutex<HashMap<String, BTreeSet<String>>>,
    ttls: Mutex<HashMap<String, u64>>,
    offline: AtomicBool,
    fail_tagging: AtomicBool,
}

impl MemoryStore {
    fn check(&self) -> AppResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::internal("cache offline"));
        }
        Ok(())
    }

    fn cached_queries(&self) -> usize {
        self.values
            .lock()
            .unwrap()
            .keys()
            .filter(|key| key.starts_with("query_cache:"))
            .count()
    }

    fn ttl_of(&self, key: &str) -> Option<u64> {
        self.ttls.lock().unwrap().get(key).copied()
    }

    fn members(&self, key: &str) -> usize {
        self.sets.lock().unwrap().get(key).map_or(0, BTreeSet::len)
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.check()?;
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set_with_ttl(&self, key: &str, value: String, ttl_seconds: u64) -> AppResult<()> {
        self.check()?;
        self.values.lock().unwrap().insert(key.to_string(), value);
        self.ttls.lock().unwrap().insert(key.to_string(), ttl_seconds);
        Ok(())
    }

    async fn delete_many(&self, keys: Vec<String>) -> AppResult<()> {
        self.check()?;
        for key in keys {
            self.values.lock().unwrap().remove(&key);
            self.sets.lock().unwrap().remove(&key);
            self.ttls.lock().unwrap().remove(&key);
        }
        Ok(())
    }

    async fn add_to_set(&self, key: &str, member: &str) -> AppResult<()> {
        self.check()?;
        if self.fail_tagging.load(Ordering::SeqCst) {
            return Err(AppError::internal("sadd refused"));
        }
        self.sets
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn set_members(&self, key: &str) -> AppResult<Vec<String>> {
        self.check()?;
        Ok(self
            .sets
            .lock()
            .unwrap()
            .get(key)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn ttl(&self, key: &str) -> AppResult<Option<u64>> {
        self.check()?;
        Ok(self.ttl_of(key))
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> AppResult<()> {
        self.check()?;
        self.ttls.lock().unwrap().insert(key.to_string(), ttl_seconds);
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        self.check()
    }
}

async fn cached_database() -> (Database, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let db = common::setup_database()
        .await
        .with_query_cache(QueryCache::new(store.clone(), 3600));
    (db, store)
}

const SELECT_REGION: &str =
    "SELECT config_value FROM app_config WHERE config_key = ? ORDER BY config_id";

async fn region(db: &Database) -> Option<String> {
    db.fetch_one(SELECT_REGION, vec!["cad.region".into()], CachePolicy::Default)
        .await
        .unwrap()
        .and_then(|row| row["config_value"].as_str().map(str::to_string))
}

async fn insert_region(db: &Database, value: &str, invalidate: bool) {
    db.execute_commit(
        "INSERT INTO app_config (config_key, config_value) VALUES (?, ?)",
        vec!["cad.region".into(), value.into()],
        invalidate,
    )
    .await
    .unwrap();
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_fetch_served_from_cache_until_invalidated() {
    let (db, store) = cached_database().await;
    insert_region(&db, "north", true).await;

    assert_eq!(region(&db).await.as_deref(), Some("north"));
    assert_eq!(store.cached_queries(), 1);
    assert_eq!(store.members("table_cache:app_config"), 1);

    // Change the row without invalidating: the cached read still wins
    db.execute_commit(
        "UPDATE app_config SET config_value = ? WHERE config_key = ?",
        vec!["south".into(), "cad.region".into()],
        false,
    )
    .await
    .unwrap();
    assert_eq!(region(&db).await.as_deref(), Some("north"));

    db.execute_commit(
        "UPDATE app_config SET config_value = ? WHERE config_key = ?",
        vec!["east".into(), "cad.region".into()],
        true,
    )
    .await
    .unwrap();
    assert_eq!(store.cached_queries(), 0);
    assert_eq!(region(&db).await.as_deref(), Some("east"));
}

#[tokio::test]
async fn test_bypass_never_touches_cache() {
    let (db, store) = cached_database().await;
    insert_region(&db, "north", true).await;

    db.fetch(SELECT_REGION, vec!["cad.region".into()], FetchMode::All, CachePolicy::Bypass)
        .await
        .unwrap();
    assert_eq!(store.cached_queries(), 0);
}

#[tokio::test]
async fn test_fetch_modes_cached_separately() {
    let (db, store) = cached_database().await;
    insert_region(&db, "north", true).await;
    insert_region(&db, "south", true).await;

    let all = db
        .fetch(SELECT_REGION, vec!["cad.region".into()], FetchMode::All, CachePolicy::Default)
        .await
        .unwrap();
    let one = db
        .fetch(SELECT_REGION, vec!["cad.region".into()], FetchMode::One, CachePolicy::Default)
        .await
        .unwrap();

    assert_eq!(all.len(), 2);
    assert_eq!(one.len(), 1);
    assert_eq!(store.cached_queries(), 2);
}

#[tokio::test]
async fn test_repository_writes_invalidate_cached_value() {
    let (db, store) = cached_database().await;
    let configs = ConfigStore::new(db);

    let entry = configs
        .create(NewConfigEntry::new("cad.region", "north"))
        .await
        .unwrap();
    assert_eq!(
        configs.value_of("cad.region").await.unwrap().as_deref(),
        Some("north")
    );
    assert_eq!(store.cached_queries(), 1);

    configs
        .update_value(entry.id, "south".to_string(), None)
        .await
        .unwrap();
    assert_eq!(
        configs.value_of("cad.region").await.unwrap().as_deref(),
        Some("south")
    );

    configs.delete_by_key("cad.region").await.unwrap();
    assert!(configs.value_of("cad.region").await.unwrap().is_none());
}

#[tokio::test]
async fn test_cache_failure_falls_through_to_database() {
    let (db, store) = cached_database().await;
    insert_region(&db, "north", true).await;
    store.offline.store(true, Ordering::SeqCst);

    assert_eq!(region(&db).await.as_deref(), Some("north"));

    // Writes still succeed while invalidation fails
    insert_region(&db, "south", true).await;
    let rows = db
        .fetch(SELECT_REGION, vec!["cad.region".into()], FetchMode::All, CachePolicy::Default)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn test_tag_set_lifetime_only_grows() {
    let (db, store) = cached_database().await;

    db.fetch(
        "SELECT user_id FROM users",
        Vec::new(),
        FetchMode::All,
        CachePolicy::Ttl(86_400),
    )
    .await
    .unwrap();
    db.fetch(
        "SELECT user_username FROM users",
        Vec::new(),
        FetchMode::All,
        CachePolicy::Ttl(10),
    )
    .await
    .unwrap();

    assert_eq!(store.ttl_of("table_cache:users"), Some(86_400));
    assert_eq!(store.members("table_cache:users"), 2);

    db.fetch(
        "SELECT user_id, user_username FROM users",
        Vec::new(),
        FetchMode::All,
        CachePolicy::Ttl(172_800),
    )
    .await
    .unwrap();
    assert_eq!(store.ttl_of("table_cache:users"), Some(172_800));
}

#[tokio::test]
async fn test_untaggable_result_not_left_in_cache() {
    let (db, store) = cached_database().await;
    insert_region(&db, "north", true).await;
    store.fail_tagging.store(true, Ordering::SeqCst);

    assert_eq!(region(&db).await.as_deref(), Some("north"));
    assert_eq!(store.cached_queries(), 0);
}

#[tokio::test]
async fn test_comma_join_invalidated_by_either_table() {
    let (db, store) = cached_database().await;
    let query = "SELECT u.user_id, c.config_id FROM users u, app_config c";

    db.fetch(query, Vec::new(), FetchMode::All, CachePolicy::Default)
        .await
        .unwrap();
    assert_eq!(store.members("table_cache:users"), 1);
    assert_eq!(store.members("table_cache:app_config"), 1);

    insert_region(&db, "north", true).await;
    assert_eq!(store.cached_queries(), 0);
}

#[tokio::test]
async fn test_redis_round_trip() {
    let Ok(redis_url) = std::env::var("REDIS_URL") else {
        return;
    };
    let cache = Cache::connect(&redis_url)
        .await
        .expect("REDIS_URL should point at a reachable server");
    let db = common::setup_database()
        .await
        .with_query_cache(QueryCache::new(Arc::new(cache.clone()), 60));

    insert_region(&db, "north", true).await;
    assert_eq!(region(&db).await.as_deref(), Some("north"));

    db.execute_commit(
        "UPDATE app_config SET config_value = ? WHERE config_key = ?",
        vec!["south".into(), "cad.region".into()],
        true,
    )
    .await
    .unwrap();
    assert_eq!(region(&db).await.as_deref(), Some("south"));

    // A short-lived entry must not shorten the tag set
    db.fetch(
        "SELECT config_key FROM app_config",
        Vec::new(),
        FetchMode::All,
        CachePolicy::Ttl(5),
    )
    .await
    .unwrap();
    let remaining = cache.ttl("table_cache:app_config").await.unwrap().unwrap();
    assert!(remaining > 5);

    db.invalidate_tables(&["app_config"]).await;
}
