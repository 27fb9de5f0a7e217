//! iCAD Dispatch - schema, data access and service process
//!
//! Owns the MySQL schema for user accounts (`users`) and key/value
//! application settings (`app_config`), a Redis-backed query cache, and
//! the containerised process that serves on port 9911.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core entities (users, configuration entries, passwords)
//! - **services**: Account and configuration use cases
//! - **infra**: Database, migrations, Redis cache and repositories
//! - **api**: HTTP liveness surface
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Apply the schema
//! icad-dispatch migrate up
//!
//! # Create an account
//! icad-dispatch user add dispatcher --password 'correct horse'
//!
//! # Start the server
//! icad-dispatch serve --host 0.0.0.0 --port 9911
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{ConfigEntry, NewConfigEntry, Password, User};
pub use errors::{AppError, AppResult};
pub use infra::{Cache, Database};
