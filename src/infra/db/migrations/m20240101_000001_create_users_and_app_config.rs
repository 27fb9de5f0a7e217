//! Migration: Create the `users` and `app_config` tables.

use sea_orm::DatabaseBackend;
use sea_orm_migration::prelude::*;

use super::with_table_options;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(with_table_options(
                manager,
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::UserId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::UserUsername).string_len(255).not_null())
                    .col(ColumnDef::new(Users::UserPassword).string_len(255).not_null())
                    .to_owned(),
            ))
            .await?;

        // LONGTEXT only exists on MySQL
        let mut description = ColumnDef::new(AppConfig::Description);
        if manager.get_database_backend() == DatabaseBackend::MySql {
            description.custom(Alias::new("LONGTEXT"));
        } else {
            description.text();
        }

        manager
            .create_table(with_table_options(
                manager,
                Table::create()
                    .table(AppConfig::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AppConfig::ConfigId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AppConfig::ConfigKey).string_len(255).null())
                    .col(ColumnDef::new(AppConfig::ConfigValue).text().null())
                    .col(description.null())
                    .to_owned(),
            ))
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AppConfig::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    UserId,
    UserUsername,
    UserPassword,
}

#[derive(Iden)]
enum AppConfig {
    Table,
    ConfigId,
    ConfigKey,
    ConfigValue,
    Description,
}
