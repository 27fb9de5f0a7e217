//! Migration: Index username and configuration key lookups.
//!
//! Both indexes are non-unique; duplicate usernames are refused by the user
//! service and duplicate configuration keys stay legal.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_users_user_username")
                    .table(Users::Table)
                    .col(Users::UserUsername)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_app_config_config_key")
                    .table(AppConfig::Table)
                    .col(AppConfig::ConfigKey)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_app_config_config_key")
                    .table(AppConfig::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_users_user_username")
                    .table(Users::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    UserUsername,
}

#[derive(Iden)]
enum AppConfig {
    Table,
    ConfigKey,
}
