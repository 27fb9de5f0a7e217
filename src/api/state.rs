//! Application state shared by the HTTP handlers.

use std::path::PathBuf;
use std::sync::Arc;

use crate::infra::{CacheStore, Database};

/// Application state (DI container for the router).
#[derive(Clone)]
pub struct AppState {
    /// Database connection
    pub database: Arc<Database>,
    /// Redis connection behind the query cache, when one is configured
    pub cache: Option<Arc<dyn CacheStore>>,
    /// Directory mounted under `/static`
    pub static_dir: PathBuf,
}

impl AppState {
    /// Build state around `database`, reusing its query cache connection
    /// for health checks.
    pub fn new(database: Database, static_dir: impl Into<PathBuf>) -> Self {
        let cache = database.query_cache().map(|query_cache| query_cache.store());

        Self {
            database: Arc::new(database),
            cache,
            static_dir: static_dir.into(),
        }
    }
}
