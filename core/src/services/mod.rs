//! Business services containing domain logic and use cases.

pub mod auth;
pub mod token;

pub use auth::AuthService;
pub use token::{TokenPairManager, TokenServiceConfig};
