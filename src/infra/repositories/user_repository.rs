//! User repository over the `users` table.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::config::TABLE_USERS;
use crate::domain::User;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Usernames are not unique at the schema level; lookups by username
/// return the row with the lowest `user_id`.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>>;

    /// Find the first user with this username
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Insert a user row unless the username is taken (`AppError::Conflict`).
    /// `password_hash` is stored as given.
    async fn create(&self, username: String, password_hash: String) -> AppResult<User>;

    /// Replace the stored password hash
    async fn update_password(&self, id: i32, password_hash: String) -> AppResult<User>;

    /// Delete user by ID
    async fn delete(&self, id: i32) -> AppResult<()>;

    /// List all users ordered by ID
    async fn list(&self) -> AppResult<Vec<User>>;
}

/// SeaORM-backed implementation of UserRepository
pub struct UserStore {
    db: Database,
}

impl UserStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn changed(&self) {
        self.db.invalidate_tables(&[TABLE_USERS]).await;
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .one(self.db.connection())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::UserUsername.eq(username))
            .order_by_asc(user::Column::UserId)
            .one(self.db.connection())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn create(&self, username: String, password_hash: String) -> AppResult<User> {
        // Check and insert share one transaction. On InnoDB the locking read
        // takes a gap lock on the username index, so a concurrent insert of
        // the same name blocks or fails instead of slipping in.
        let txn = self.db.connection().begin().await?;

        let taken = UserEntity::find()
            .filter(user::Column::UserUsername.eq(username.as_str()))
            .lock_exclusive()
            .one(&txn)
            .await?
            .is_some();
        if taken {
            txn.rollback().await?;
            return Err(AppError::conflict(format!("User '{}'", username)));
        }

        let active_model = ActiveModel {
            user_username: Set(username),
            user_password: Set(password_hash),
            ..Default::default()
        };
        let model = active_model.insert(&txn).await.map_err(AppError::from)?;
        txn.commit().await?;
        self.changed().await;

        tracing::debug!(user_id = model.user_id, "User created");
        Ok(User::from(model))
    }

    async fn update_password(&self, id: i32, password_hash: String) -> AppResult<User> {
        let user = UserEntity::find_by_id(id)
            .one(self.db.connection())
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = user.into();
        active.user_password = Set(password_hash);

        let model = active
            .update(self.db.connection())
            .await
            .map_err(AppError::from)?;
        self.changed().await;

        Ok(User::from(model))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id)
            .exec(self.db.connection())
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        self.changed().await;

        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::UserId)
            .all(self.db.connection())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(User::from).collect())
    }
}
