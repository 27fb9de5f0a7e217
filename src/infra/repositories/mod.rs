//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod config_repository;
pub mod entities;
mod user_repository;

pub use config_repository::{ConfigRepository, ConfigStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use config_repository::MockConfigRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
