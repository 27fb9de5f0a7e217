//! Database connection, migrations and the cached raw-SQL executor.

use std::collections::HashSet;
use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseBackend,
    DatabaseConnection, DbErr, FromQueryResult, JsonValue, Statement, TransactionTrait, Value,
};
use sea_orm_migration::MigratorTrait;

use super::query_cache::{cache_key, extract_tables, QueryCache};
use crate::config::{Config, DEFAULT_COMMIT_BATCH_SIZE};
use crate::errors::{AppError, AppResult};

pub mod migrations;

pub use migrations::Migrator;

/// How many rows a read returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Every row
    All,
    /// At most `n` rows
    Many(usize),
    /// At most one row
    One,
}

/// Whether a read may be served from, and stored into, the query cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Use the cache with its configured TTL
    #[default]
    Default,
    /// Use the cache with a TTL in seconds
    Ttl(u64),
    /// Always hit the database, store nothing
    Bypass,
}

/// Result of a committed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitOutcome {
    pub last_insert_id: u64,
    pub rows_affected: u64,
}

/// Database wrapper for connection management
#[derive(Clone)]
pub struct Database {
    connection: DatabaseConnection,
    cache: Option<QueryCache>,
}

impl Database {
    /// Connect and apply pending migrations.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let db = Self::connect_without_migrations(config).await?;
        db.run_migrations().await?;
        tracing::info!("Database connected and migrations applied");
        Ok(db)
    }

    /// Connect without running migrations (for CLI commands).
    pub async fn connect_without_migrations(config: &Config) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(config.database_url.clone());
        options
            .max_connections(config.db_max_connections)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);
        Self::connect_with(options).await
    }

    /// Connect with explicit pool options.
    pub async fn connect_with(options: ConnectOptions) -> Result<Self, DbErr> {
        let connection = SeaDatabase::connect(options).await?;
        Ok(Self::from_connection(connection))
    }

    /// Wrap an existing connection, without a query cache.
    pub fn from_connection(connection: DatabaseConnection) -> Self {
        Self {
            connection,
            cache: None,
        }
    }

    /// Attach a query cache for `fetch` and write invalidation.
    pub fn with_query_cache(mut self, cache: QueryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Get the attached query cache, if any.
    pub fn query_cache(&self) -> Option<&QueryCache> {
        self.cache.as_ref()
    }

    /// Get a reference to the database connection.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    pub fn backend(&self) -> DatabaseBackend {
        self.connection.get_database_backend()
    }

    // =========================================================================
    // Migrations
    // =========================================================================

    /// Run pending migrations.
    pub async fn run_migrations(&self) -> Result<(), DbErr> {
        Migrator::up(&self.connection, None).await
    }

    /// Rollback the last migration.
    pub async fn rollback_migration(&self) -> Result<(), DbErr> {
        Migrator::down(&self.connection, Some(1)).await
    }

    /// Get migration status (list all migrations with applied status).
    pub async fn migration_status(&self) -> Result<Vec<(String, bool)>, DbErr> {
        use sea_orm::{EntityTrait, QueryOrder};
        use sea_orm_migration::seaql_migrations;

        let applied: HashSet<String> = seaql_migrations::Entity::find()
            .order_by_asc(seaql_migrations::Column::Version)
            .all(&self.connection)
            .await?
            .into_iter()
            .map(|m| m.version)
            .collect();

        let migrations: Vec<(String, bool)> = Migrator::migrations()
            .iter()
            .map(|m| {
                let name = m.name().to_string();
                let is_applied = applied.contains(&name);
                (name, is_applied)
            })
            .collect();

        Ok(migrations)
    }

    /// Reset database and run all migrations fresh.
    pub async fn fresh_migrations(&self) -> Result<(), DbErr> {
        Migrator::fresh(&self.connection).await
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Check database connectivity by executing a simple query.
    pub async fn ping(&self) -> Result<(), DbErr> {
        self.connection
            .execute(Statement::from_string(self.backend(), "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    /// Whether the database answers at all.
    pub async fn is_connected(&self) -> bool {
        match self.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Database connection check failed");
                false
            }
        }
    }

    /// Version string reported by the server.
    pub async fn version(&self) -> AppResult<String> {
        let sql = match self.backend() {
            DatabaseBackend::Sqlite => "SELECT sqlite_version() AS version",
            _ => "SELECT VERSION() AS version",
        };

        let row = self.fetch_one(sql, Vec::new(), CachePolicy::Bypass).await?;
        Ok(row
            .as_ref()
            .and_then(|r| r.get("version"))
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string())
    }

    /// Check if a table exists in the connected database.
    pub async fn table_exists(&self, table_name: &str) -> AppResult<bool> {
        let sql = match self.backend() {
            DatabaseBackend::Sqlite => {
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?"
            }
            _ => {
                "SELECT TABLE_NAME AS name FROM information_schema.TABLES \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?"
            }
        };

        let row = self
            .fetch_one(sql, vec![table_name.into()], CachePolicy::Bypass)
            .await?;
        Ok(row.is_some())
    }

    // =========================================================================
    // Raw SQL execution
    // =========================================================================

    /// Execute a read query and return its rows as JSON objects.
    ///
    /// With a query cache attached (and a policy other than `Bypass`), results
    /// are served from Redis when present and stored there after a miss,
    /// tagged with every table the query reads.
    pub async fn fetch(
        &self,
        query: &str,
        params: Vec<Value>,
        mode: FetchMode,
        policy: CachePolicy,
    ) -> AppResult<Vec<JsonValue>> {
        let cache = match policy {
            CachePolicy::Bypass => None,
            _ => self.cache.as_ref(),
        };
        let key = cache.map(|_| cache_key(query, &format!("{:?}|{:?}", params, mode)));

        if let (Some(cache), Some(key)) = (cache, key.as_deref()) {
            if let Some(rows) = cache.lookup(key).await {
                tracing::debug!(query, "Served query from cache");
                return Ok(rows);
            }
        }

        let statement = Statement::from_sql_and_values(self.backend(), query, params);
        let selector = JsonValue::find_by_statement(statement);
        let result = match mode {
            FetchMode::One => selector
                .one(&self.connection)
                .await
                .map(|row| row.into_iter().collect::<Vec<_>>()),
            FetchMode::All | FetchMode::Many(_) => selector.all(&self.connection).await,
        };

        let mut rows = result.map_err(|e| {
            tracing::error!(error = %e, query, "Query execution failed");
            AppError::from(e)
        })?;
        if let FetchMode::Many(limit) = mode {
            rows.truncate(limit);
        }

        if let (Some(cache), Some(key)) = (cache, key) {
            let ttl = match policy {
                CachePolicy::Ttl(seconds) => seconds,
                _ => cache.default_ttl(),
            };
            cache.put(&key, &rows, &extract_tables(query), ttl).await;
        }

        Ok(rows)
    }

    /// Execute a read query returning at most one row.
    pub async fn fetch_one(
        &self,
        query: &str,
        params: Vec<Value>,
        policy: CachePolicy,
    ) -> AppResult<Option<JsonValue>> {
        Ok(self
            .fetch(query, params, FetchMode::One, policy)
            .await?
            .into_iter()
            .next())
    }

    /// Execute a single write in its own transaction.
    ///
    /// Rolls back on failure. When `invalidate` is set, cached reads of every
    /// table the statement touches are dropped after the commit.
    pub async fn execute_commit(
        &self,
        query: &str,
        params: Vec<Value>,
        invalidate: bool,
    ) -> AppResult<CommitOutcome> {
        let txn = self.connection.begin().await?;
        let statement = Statement::from_sql_and_values(self.backend(), query, params);

        let result = match txn.execute(statement).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, query, "Commit query failed");
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                return Err(e.into());
            }
        };
        txn.commit().await?;
        tracing::debug!(query, "Commit query executed");

        if invalidate {
            self.invalidate_tables(&extract_tables(query)).await;
        }

        Ok(CommitOutcome {
            last_insert_id: result.last_insert_id(),
            rows_affected: result.rows_affected(),
        })
    }

    /// Execute one write per parameter row, committing every `batch_size` rows
    /// (`DEFAULT_COMMIT_BATCH_SIZE` when `None`).
    ///
    /// Batches committed before a failure stay committed. Returns the total
    /// number of affected rows.
    pub async fn execute_many_commit(
        &self,
        query: &str,
        rows: Vec<Vec<Value>>,
        batch_size: Option<usize>,
    ) -> AppResult<u64> {
        let batch_size = batch_size.unwrap_or(DEFAULT_COMMIT_BATCH_SIZE);
        if rows.is_empty() {
            tracing::warn!(query, "No data provided for batch execution");
            return Err(AppError::validation("No data provided for batch execution"));
        }
        if batch_size == 0 {
            return Err(AppError::validation("batch_size must be greater than 0"));
        }

        let total_batches = rows.len().div_ceil(batch_size);
        let mut affected = 0;
        let mut outcome = Ok(());

        for (index, batch) in rows.chunks(batch_size).enumerate() {
            match self.commit_batch(query, batch).await {
                Ok(count) => {
                    affected += count;
                    tracing::info!("Batch {} of {} committed", index + 1, total_batches);
                }
                Err(e) => {
                    tracing::error!(error = %e, query, batch = index + 1, "Batch commit failed");
                    outcome = Err(e);
                    break;
                }
            }
        }

        self.invalidate_tables(&extract_tables(query)).await;
        outcome.map(|()| affected)
    }

    async fn commit_batch(&self, query: &str, batch: &[Vec<Value>]) -> AppResult<u64> {
        let txn = self.connection.begin().await?;
        let mut affected = 0;

        for params in batch {
            let statement =
                Statement::from_sql_and_values(self.backend(), query, params.iter().cloned());
            match txn.execute(statement).await {
                Ok(result) => affected += result.rows_affected(),
                Err(e) => {
                    if let Err(rollback_err) = txn.rollback().await {
                        tracing::error!("Transaction rollback failed: {}", rollback_err);
                    }
                    return Err(e.into());
                }
            }
        }

        txn.commit().await?;
        Ok(affected)
    }

    /// Drop cached reads of the given tables. No-op without a cache.
    pub async fn invalidate_tables<S: AsRef<str>>(&self, tables: &[S]) {
        if let Some(cache) = &self.cache {
            for table in tables {
                cache.invalidate_table(table.as_ref()).await;
            }
        }
    }
}
