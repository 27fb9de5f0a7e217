//! Config command - Application configuration entries.

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::Config;
use crate::errors::AppResult;
use crate::services::{ServiceContainer, Services};

/// Execute the config command
pub async fn execute(args: ConfigArgs, config: Config) -> AppResult<()> {
    let db = super::open_database(&config).await?;
    let entries = Services::from_database(&db).config();

    match args.action {
        ConfigAction::Get { key } => {
            println!("{}", entries.get(&key).await?);
        }
        ConfigAction::Set {
            key,
            value,
            description,
        } => {
            let entry = entries.set(&key, value, description).await?;
            println!("Set '{}' (id {})", key, entry.id);
        }
        ConfigAction::Unset { key } => {
            let removed = entries.unset(&key).await?;
            let noun = if removed == 1 { "entry" } else { "entries" };
            println!("Removed {} {} for '{}'", removed, noun, key);
        }
        ConfigAction::List => {
            for entry in entries.list().await? {
                println!(
                    "{:>6}  {} = {}{}",
                    entry.id,
                    entry.key.as_deref().unwrap_or("<null>"),
                    entry.value.as_deref().unwrap_or("<null>"),
                    entry
                        .description
                        .map(|d| format!("  # {}", d))
                        .unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}
