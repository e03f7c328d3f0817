pub mod auth;
pub mod cors;
pub mod trace;

pub use auth::{AuthContext, JwtAuth, TokenGate};
pub use cors::create_cors;
pub use trace::{RequestTrace, TraceId};
