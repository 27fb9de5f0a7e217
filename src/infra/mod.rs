//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - MySQL connection, migrations and raw SQL execution
//! - Redis connection and the query result cache
//! - Repositories over the `users` and `app_config` tables

pub mod cache;
pub mod db;
pub mod query_cache;
pub mod repositories;

pub use cache::{Cache, CacheStore};
pub use db::{CachePolicy, CommitOutcome, Database, FetchMode, Migrator};
pub use query_cache::QueryCache;
pub use repositories::{ConfigRepository, ConfigStore, UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockConfigRepository, MockUserRepository};
