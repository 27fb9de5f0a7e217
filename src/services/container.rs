//! Service Container - Centralized service access.
//!
//! SOLID (DIP): Depends on service traits, not implementations.

use std::sync::Arc;

use super::{ConfigManager, ConfigService, UserManager, UserService};
use crate::infra::{ConfigStore, Database, UserStore};

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    /// Get user service
    fn users(&self) -> Arc<dyn UserService>;

    /// Get configuration service
    fn config(&self) -> Arc<dyn ConfigService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    user_service: Arc<dyn UserService>,
    config_service: Arc<dyn ConfigService>,
}

impl Services {
    /// Create a new service container with all services initialized
    pub fn new(user_service: Arc<dyn UserService>, config_service: Arc<dyn ConfigService>) -> Self {
        Self {
            user_service,
            config_service,
        }
    }

    /// Wire every service to repositories over `db`
    pub fn from_database(db: &Database) -> Self {
        let users = Arc::new(UserStore::new(db.clone()));
        let entries = Arc::new(ConfigStore::new(db.clone()));

        Self {
            user_service: Arc::new(UserManager::new(users)),
            config_service: Arc::new(ConfigManager::new(entries)),
        }
    }
}

impl ServiceContainer for Services {
    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn config(&self) -> Arc<dyn ConfigService> {
        self.config_service.clone()
    }
}
