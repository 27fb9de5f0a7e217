//! User command - Account administration from the command line.

use crate::cli::args::{UserAction, UserArgs};
use crate::config::Config;
use crate::domain::UserResponse;
use crate::errors::AppResult;
use crate::services::{ServiceContainer, Services};

/// Execute the user command
pub async fn execute(args: UserArgs, config: Config) -> AppResult<()> {
    let db = super::open_database(&config).await?;
    let users = Services::from_database(&db).users();

    match args.action {
        UserAction::Add { username, password } => {
            let user = users.create_user(username, password).await?;
            println!("Created user '{}' (id {})", user.username, user.id);
        }
        UserAction::Passwd { username, password } => {
            let user = users.set_password(&username, password).await?;
            println!("Password updated for '{}'", user.username);
        }
        UserAction::Remove { username } => {
            users.remove_user(&username).await?;
            println!("Removed user '{}'", username);
        }
        UserAction::List => {
            for user in users.list_users().await? {
                let user = UserResponse::from(user);
                println!("{:>6}  {}", user.id, user.username);
            }
        }
    }

    Ok(())
}
