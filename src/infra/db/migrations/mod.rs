//! Database migrations.
//!
//! Each migration is a separate module following SeaORM conventions.
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm::DatabaseBackend;
use sea_orm_migration::prelude::*;

use crate::config::{MYSQL_CHARSET, MYSQL_COLLATION, MYSQL_ENGINE};

mod m20240101_000001_create_users_and_app_config;
mod m20240102_000001_add_lookup_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_and_app_config::Migration),
            Box::new(m20240102_000001_add_lookup_indexes::Migration),
        ]
    }
}

/// Apply engine, charset and collation on MySQL. Other backends take the
/// statement unchanged.
pub(crate) fn with_table_options(
    manager: &SchemaManager,
    mut table: TableCreateStatement,
) -> TableCreateStatement {
    if manager.get_database_backend() == DatabaseBackend::MySql {
        table
            .engine(MYSQL_ENGINE)
            .character_set(MYSQL_CHARSET)
            .collate(MYSQL_COLLATION);
    }
    table
}
