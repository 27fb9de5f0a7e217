//! Shared fixtures for integration tests.

use icad_dispatch::infra::Database;
use sea_orm::ConnectOptions;

/// Fresh in-memory SQLite database with every migration applied.
///
/// A single pooled connection keeps the in-memory database alive for the
/// whole test.
pub async fn setup_database() -> Database {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect_with(options)
        .await
        .expect("in-memory sqlite should connect");
    db.run_migrations()
        .await
        .expect("migrations should apply");
    db
}
