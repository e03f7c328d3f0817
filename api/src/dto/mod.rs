pub mod auth;
pub mod system;

pub use auth::*;
pub use system::HealthResponse;
