//! API layer - HTTP surface of the service process
//!
//! Liveness only: banner, health check, static files and a JSON 404.

pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
