//! User service - account administration over the `users` table.
//!
//! Passwords are hashed through the domain `Password` value object before
//! they reach the repository. Usernames are unique by service contract: the
//! repository refuses a taken name inside the inserting transaction.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::MAX_IDENTIFIER_LENGTH;
use crate::domain::{Password, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UserRepository;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Create an account, refusing a username already in use
    async fn create_user(&self, username: String, password: String) -> AppResult<User>;

    /// Hash and store a new password
    async fn set_password(&self, username: &str, password: String) -> AppResult<User>;

    /// Delete an account
    async fn remove_user(&self, username: &str) -> AppResult<()>;

    /// Get user by username
    async fn find_user(&self, username: &str) -> AppResult<User>;

    /// List all users
    async fn list_users(&self) -> AppResult<Vec<User>>;
}

/// Concrete implementation of UserService.
pub struct UserManager {
    users: Arc<dyn UserRepository>,
}

impl UserManager {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

fn validate_username(username: &str) -> AppResult<()> {
    if username.trim().is_empty() {
        return Err(AppError::validation("Username must not be empty"));
    }
    if username.chars().count() > MAX_IDENTIFIER_LENGTH {
        return Err(AppError::validation(format!(
            "Username must be at most {} characters",
            MAX_IDENTIFIER_LENGTH
        )));
    }
    Ok(())
}

#[async_trait]
impl UserService for UserManager {
    async fn create_user(&self, username: String, password: String) -> AppResult<User> {
        validate_username(&username)?;

        let password_hash = Password::new(&password)?.into_string();
        let user = self.users.create(username, password_hash).await?;

        tracing::info!(user_id = user.id, username = %user.username, "User created");
        Ok(user)
    }

    async fn set_password(&self, username: &str, password: String) -> AppResult<User> {
        let user = self.find_user(username).await?;
        let password_hash = Password::new(&password)?.into_string();

        let user = self.users.update_password(user.id, password_hash).await?;
        tracing::info!(user_id = user.id, "Password changed");
        Ok(user)
    }

    async fn remove_user(&self, username: &str) -> AppResult<()> {
        let user = self.find_user(username).await?;
        self.users.delete(user.id).await?;

        tracing::info!(user_id = user.id, username, "User removed");
        Ok(())
    }

    async fn find_user(&self, username: &str) -> AppResult<User> {
        self.users.find_by_username(username).await?.ok_or_not_found()
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.users.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::MockUserRepository;

    fn existing(id: i32, username: &str) -> User {
        User::new(id, username.to_string(), "$argon2id$stored".to_string())
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let mut repo = MockUserRepository::new();
        repo.expect_create()
            .withf(|username, hash| username == "dispatcher" && hash.starts_with("$argon2"))
            .times(1)
            .returning(|username, hash| Ok(User::new(1, username, hash)));

        let service = UserManager::new(Arc::new(repo));
        let user = service
            .create_user("dispatcher".to_string(), "correct horse".to_string())
            .await
            .unwrap();

        assert_eq!(user.id, 1);
        assert!(Password::from_hash(user.password_hash).verify("correct horse"));
    }

    #[tokio::test]
    async fn test_create_user_rejects_taken_username() {
        let mut repo = MockUserRepository::new();
        repo.expect_create()
            .times(1)
            .returning(|username, _| Err(AppError::conflict(format!("User '{}'", username))));

        let service = UserManager::new(Arc::new(repo));
        let result = service
            .create_user("dispatcher".to_string(), "correct horse".to_string())
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_user_rejects_short_password() {
        let mut repo = MockUserRepository::new();
        repo.expect_create().never();

        let service = UserManager::new(Arc::new(repo));
        let result = service
            .create_user("dispatcher".to_string(), "short".to_string())
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_user_rejects_bad_username() {
        let repo = MockUserRepository::new();
        let service = UserManager::new(Arc::new(repo));

        let blank = service
            .create_user("   ".to_string(), "correct horse".to_string())
            .await;
        assert!(matches!(blank, Err(AppError::Validation(_))));

        let long = service
            .create_user("x".repeat(256), "correct horse".to_string())
            .await;
        assert!(matches!(long, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_set_password_unknown_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username().returning(|_| Ok(None));
        repo.expect_update_password().never();

        let service = UserManager::new(Arc::new(repo));
        let result = service
            .set_password("ghost", "correct horse".to_string())
            .await;

        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_set_password_rehashes() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username()
            .returning(|name| Ok(Some(existing(9, name))));
        repo.expect_update_password()
            .withf(|id, hash| *id == 9 && hash.starts_with("$argon2"))
            .times(1)
            .returning(|id, hash| Ok(User::new(id, "ops".to_string(), hash)));

        let service = UserManager::new(Arc::new(repo));
        let user = service
            .set_password("ops", "battery staple".to_string())
            .await
            .unwrap();

        assert!(Password::from_hash(user.password_hash).verify("battery staple"));
    }

    #[tokio::test]
    async fn test_remove_user_deletes_by_id() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username()
            .returning(|name| Ok(Some(existing(12, name))));
        repo.expect_delete()
            .withf(|id| *id == 12)
            .times(1)
            .returning(|_| Ok(()));

        let service = UserManager::new(Arc::new(repo));
        assert!(service.remove_user("ops").await.is_ok());
    }
}
