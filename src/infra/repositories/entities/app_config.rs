//! Application configuration entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::ConfigEntry;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "app_config")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub config_id: i32,
    pub config_key: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub config_value: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ConfigEntry {
    fn from(model: Model) -> Self {
        ConfigEntry {
            id: model.config_id,
            key: model.config_key,
            value: model.config_value,
            description: model.description,
        }
    }
}
