//! # Keystone API
//!
//! HTTP surface of the Keystone backend: the actix application factory,
//! request middleware, route handlers and the logging bootstrap used by the
//! `keystone` binary.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod routes;

pub use app::{configure_routes, AppFactory};
pub use logging::{init_logging, LoggingError, LoggingGuard};
