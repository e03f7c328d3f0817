//! Authentication route handlers
//!
//! - `POST /login` issues a token pair for valid credentials
//! - `POST /refresh` rotates the access token bound to a refresh token
//! - `POST /logout` releases the caller's pair (bearer required)
//! - `GET /me` describes the authenticated caller (bearer required)

pub mod login;
pub mod logout;
pub mod me;
pub mod refresh;

use std::sync::Arc;

use ks_core::repositories::{CacheStore, UserDirectory};
use ks_core::services::auth::AuthService;

pub use login::login;
pub use logout::logout;
pub use me::me;
pub use refresh::refresh;

/// Application state that holds shared services
pub struct AppState<U, C>
where
    U: UserDirectory,
    C: CacheStore,
{
    pub auth_service: Arc<AuthService<U, C>>,
}

impl<U: UserDirectory, C: CacheStore> AppState<U, C> {
    pub fn new(auth_service: Arc<AuthService<U, C>>) -> Self {
        Self { auth_service }
    }
}
