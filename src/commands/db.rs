//! Db command - Database inspection.

use crate::cli::args::{DbAction, DbArgs};
use crate::config::{Config, TABLE_APP_CONFIG, TABLE_USERS};
use crate::errors::AppResult;
use crate::infra::Database;

/// Execute the db command
pub async fn execute(args: DbArgs, config: Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config).await?;

    match args.action {
        DbAction::Info => {
            let connected = db.is_connected().await;
            println!("backend:   {:?}", db.backend());
            println!("connected: {}", connected);
            if !connected {
                return Ok(());
            }

            println!("version:   {}", db.version().await?);
            for table in [TABLE_USERS, TABLE_APP_CONFIG] {
                let state = if db.table_exists(table).await? {
                    "present"
                } else {
                    "missing"
                };
                println!("table {:<11}{}", table, state);
            }
        }
    }

    Ok(())
}
