//! iCAD Dispatch - Application entry point
//!
//! CLI-based entry point that dispatches to various commands.

use std::fs::{self, OpenOptions};
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use icad_dispatch::{
    cli::{Cli, Commands},
    commands,
    config::{Config, APP_NAME},
};

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration (tracing depends on it)
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    init_tracing(cli.verbose, &config);
    tracing::debug!(?config, "Configuration loaded");

    // Execute command
    let result = match cli.command {
        Commands::Serve(args) => commands::serve::execute(args, config).await,
        Commands::Migrate(args) => commands::migrate::execute(args, config).await,
        Commands::User(args) => commands::user::execute(args, config).await,
        Commands::Config(args) => commands::config::execute(args, config).await,
        Commands::Db(args) => commands::db::execute(args, config).await,
    };

    // Handle errors
    if let Err(e) = result {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing: stdout plus `<LOG_DIR>/icad_dispatch.log`.
///
/// `RUST_LOG` wins, then `--verbose`, then `LOG_LEVEL`.
fn init_tracing(verbose: bool, config: &Config) {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| {
            if verbose {
                "debug".to_string()
            } else {
                config.log_filter().to_string()
            }
        });

    let log_path = config.log_dir.join(format!("{}.log", APP_NAME));
    let log_file = fs::create_dir_all(&config.log_dir).and_then(|()| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
    });

    let (file_layer, file_error) = match log_file {
        Ok(file) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            ),
            None,
        ),
        Err(e) => (None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    if let Some(e) = file_error {
        tracing::warn!(error = %e, path = %log_path.display(), "File logging disabled");
    }
}
