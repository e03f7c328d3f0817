pub mod error;

pub use error::{handle_domain_error, handle_request_error, json_config, not_found};
