//! Commands module - CLI command implementations.
//!
//! Each command is implemented in its own module for separation of concerns.

pub mod config;
pub mod db;
pub mod migrate;
pub mod serve;
pub mod user;

use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{Cache, Database, QueryCache};

/// Connect, apply pending migrations and attach the query cache when Redis
/// is configured. An unreachable Redis degrades to uncached access.
pub(crate) async fn open_database(config: &Config) -> AppResult<Database> {
    let db = Database::connect(config).await?;

    let Some(redis_url) = &config.redis_url else {
        tracing::info!("Query cache disabled");
        return Ok(db);
    };

    match Cache::connect(redis_url).await {
        Ok(cache) => {
            tracing::info!(ttl = config.query_cache_ttl_seconds, "Query cache enabled");
            Ok(db.with_query_cache(QueryCache::new(
                Arc::new(cache),
                config.query_cache_ttl_seconds,
            )))
        }
        Err(e) => {
            tracing::error!(error = %e, "Redis unavailable, continuing without query cache");
            Ok(db)
        }
    }
}
