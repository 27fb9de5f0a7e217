//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `serve` - Start the HTTP server
//! - `migrate` - Database migrations
//! - `user` - User account administration
//! - `config` - Application configuration entries
//! - `db` - Database inspection

pub mod args;

pub use args::{Cli, Commands};
