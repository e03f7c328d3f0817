//! Authentication service module
//!
//! Credential checks for login and the thin wrappers the HTTP layer uses to
//! refresh and release token pairs.

mod service;


pub use service::AuthService;
