//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

/// iCAD Dispatch - schema, data access and service process
#[derive(Parser, Debug)]
#[command(name = "icad-dispatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Manage user accounts
    User(UserArgs),

    /// Manage application configuration entries
    Config(ConfigArgs),

    /// Inspect the database
    Db(DbArgs),
}

/// Arguments for the serve command
///
/// Both fall back to `SERVER_HOST` / `SERVER_PORT` from the loaded configuration.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the user command
#[derive(Parser, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub action: UserAction,
}

/// User management actions
#[derive(Subcommand, Debug)]
pub enum UserAction {
    /// Create a user account
    Add {
        username: String,
        /// Plain text password, hashed before storage
        #[arg(long, env = "ICAD_USER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Change a user's password
    Passwd {
        username: String,
        #[arg(long, env = "ICAD_USER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Delete a user account
    Remove { username: String },
    /// List user accounts
    List,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration entry actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the value stored for a key
    Get { key: String },
    /// Store a value, updating the existing entry if there is one
    Set {
        key: String,
        value: String,
        /// Free-form description kept next to the value
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Remove every entry for a key
    Unset { key: String },
    /// List all entries
    List,
}

/// Arguments for the db command
#[derive(Parser, Debug)]
pub struct DbArgs {
    #[command(subcommand)]
    pub action: DbAction,
}

/// Database inspection actions
#[derive(Subcommand, Debug)]
pub enum DbAction {
    /// Show server version, connectivity and table presence
    Info,
}
