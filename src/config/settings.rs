//! Application settings loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use url::Url;

use super::constants::{
    DEFAULT_DB_MAX_CONNECTIONS, DEFAULT_LOG_DIR, DEFAULT_LOG_LEVEL, DEFAULT_MYSQL_PORT,
    DEFAULT_QUERY_CACHE_TTL_SECONDS, DEFAULT_REDIS_PORT, DEFAULT_REDIS_QUERY_CACHE_DB,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_STATIC_DIR,
};
use crate::errors::{AppError, AppResult};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    /// `None` when the query cache is switched off
    pub redis_url: Option<String>,
    pub query_cache_ttl_seconds: u64,
    pub server_host: String,
    pub server_port: u16,
    pub static_dir: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: u8,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("db_max_connections", &self.db_max_connections)
            .field(
                "redis_url",
                &self.redis_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("query_cache_ttl_seconds", &self.query_cache_ttl_seconds)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("static_dir", &self.static_dir)
            .field("log_dir", &self.log_dir)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as unset. Without `DATABASE_URL` the `MYSQL_*`
    /// variables are required; without `QUERY_CACHE=off` the Redis host and
    /// password are required.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &str| {
            get(name).ok_or_else(|| {
                AppError::config(format!("Missing required environment variable: {}", name))
            })
        };

        let database_url = match get("DATABASE_URL") {
            Some(url) => url,
            None => mysql_url(
                &require("MYSQL_HOST")?,
                parse_or("MYSQL_PORT", get("MYSQL_PORT"), DEFAULT_MYSQL_PORT)?,
                &require("MYSQL_USER")?,
                &require("MYSQL_PASSWORD")?,
                &require("MYSQL_DATABASE")?,
            )?,
        };

        let cache_enabled = !matches!(
            get("QUERY_CACHE").as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("off" | "false" | "0")
        );

        let redis_url = if cache_enabled {
            Some(redis_url(
                &require("REDIS_HOST")?,
                parse_or("REDIS_PORT", get("REDIS_PORT"), DEFAULT_REDIS_PORT)?,
                &require("REDIS_PASSWORD")?,
                parse_or(
                    "REDIS_MYSQL_CACHE_DB",
                    get("REDIS_MYSQL_CACHE_DB"),
                    DEFAULT_REDIS_QUERY_CACHE_DB,
                )?,
            )?)
        } else {
            None
        };

        Ok(Self {
            database_url,
            db_max_connections: parse_or(
                "DB_MAX_CONNECTIONS",
                get("DB_MAX_CONNECTIONS"),
                DEFAULT_DB_MAX_CONNECTIONS,
            )?,
            redis_url,
            query_cache_ttl_seconds: parse_or(
                "QUERY_CACHE_TTL_SECONDS",
                get("QUERY_CACHE_TTL_SECONDS"),
                DEFAULT_QUERY_CACHE_TTL_SECONDS,
            )?,
            server_host: get("SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            server_port: parse_or("SERVER_PORT", get("SERVER_PORT"), DEFAULT_SERVER_PORT)?,
            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
            log_dir: get("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
            log_level: parse_or("LOG_LEVEL", get("LOG_LEVEL"), DEFAULT_LOG_LEVEL)?,
        })
    }

    /// Whether query results are cached in Redis.
    pub fn cache_enabled(&self) -> bool {
        self.redis_url.is_some()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Tracing filter directive matching `LOG_LEVEL`.
    pub fn log_filter(&self) -> &'static str {
        match self.log_level {
            0 | 1 => "debug",
            2 => "info",
            3 => "warn",
            _ => "error",
        }
    }
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or<T: FromStr>(name: &str, value: Option<String>, default: T) -> AppResult<T> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::config(format!("Invalid value for {}: {}", name, raw))),
        None => Ok(default),
    }
}

/// Build a MySQL connection URL with percent-encoded credentials.
fn mysql_url(host: &str, port: u16, user: &str, password: &str, database: &str) -> AppResult<String> {
    let mut url = Url::parse(&format!("mysql://{}:{}/{}", host, port, database))
        .map_err(|e| AppError::config(format!("Invalid MySQL address: {}", e)))?;
    url.set_username(user)
        .map_err(|_| AppError::config("MYSQL_USER cannot be used in a connection URL"))?;
    url.set_password(Some(password))
        .map_err(|_| AppError::config("MYSQL_PASSWORD cannot be used in a connection URL"))?;
    Ok(url.into())
}

/// Build a Redis connection URL selecting the query cache database.
fn redis_url(host: &str, port: u16, password: &str, db: i64) -> AppResult<String> {
    let mut url = Url::parse(&format!("redis://{}:{}/{}", host, port, db))
        .map_err(|e| AppError::config(format!("Invalid Redis address: {}", e)))?;
    url.set_password(Some(password))
        .map_err(|_| AppError::config("REDIS_PASSWORD cannot be used in a connection URL"))?;
    Ok(url.into())
}
