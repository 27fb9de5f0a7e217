//! Domain layer - Core entities independent of storage.

pub mod app_config;
pub mod password;
pub mod user;

pub use app_config::{ConfigEntry, NewConfigEntry};
pub use password::Password;
pub use user::{User, UserResponse};
