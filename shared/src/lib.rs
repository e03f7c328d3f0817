//! # Keystone Shared
//!
//! Building blocks shared by every Keystone crate: the application configuration
//! tree and its loader, the error catalog used to render response messages, and
//! the JSON response envelope.

pub mod config;
pub mod errors;
pub mod types;

pub use config::AppConfig;
pub use errors::ErrorCatalog;
pub use types::response::ApiResult;
