//! Application-wide constants
//!
//! Centralized location for magic values to improve maintainability.

// =============================================================================
// Application
// =============================================================================

/// Application name, used for the log file and log target
pub const APP_NAME: &str = "icad_dispatch";

/// Default log level (1 = debug, 2 = info, 3 = warn, 4+ = error)
pub const DEFAULT_LOG_LEVEL: u8 = 1;

/// Default directory for the application log file
pub const DEFAULT_LOG_DIR: &str = "log";

// =============================================================================
// Server Configuration
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port (the single port exposed by the container image)
pub const DEFAULT_SERVER_PORT: u16 = 9911;

/// Default directory served under `/static`
pub const DEFAULT_STATIC_DIR: &str = "static";

// =============================================================================
// Database (MySQL)
// =============================================================================

/// Default MySQL port
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Default size of the database connection pool
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Table holding user credentials
pub const TABLE_USERS: &str = "users";

/// Table holding key/value application configuration
pub const TABLE_APP_CONFIG: &str = "app_config";

/// Character set applied to every table on MySQL
pub const MYSQL_CHARSET: &str = "utf8mb4";

/// Collation applied to every table on MySQL
pub const MYSQL_COLLATION: &str = "utf8mb4_general_ci";

/// Storage engine applied to every table on MySQL (transactional)
pub const MYSQL_ENGINE: &str = "InnoDB";

/// Default rows per transaction for batched writes
pub const DEFAULT_COMMIT_BATCH_SIZE: usize = 1000;

// =============================================================================
// Cache (Redis)
// =============================================================================

/// Default Redis port
pub const DEFAULT_REDIS_PORT: u16 = 6379;

/// Default Redis logical database used for query caching
pub const DEFAULT_REDIS_QUERY_CACHE_DB: i64 = 4;

/// Default query cache TTL in seconds (24 hours)
pub const DEFAULT_QUERY_CACHE_TTL_SECONDS: u64 = 86_400;

/// Cache key prefix for cached query results
pub const CACHE_PREFIX_QUERY: &str = "query_cache:";

/// Cache key prefix for the per-table sets of cached query keys
pub const CACHE_PREFIX_TABLE: &str = "table_cache:";

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum length of usernames and configuration keys (VARCHAR(255))
pub const MAX_IDENTIFIER_LENGTH: usize = 255;
