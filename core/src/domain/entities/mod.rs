//! Domain entities representing core business objects.

pub mod token;

pub use token::{
    access_key, mask_token, refresh_key, Claims, TokenKind, TokenPair, ACCESS_KEY_PREFIX,
    REFRESH_KEY_PREFIX,
};
