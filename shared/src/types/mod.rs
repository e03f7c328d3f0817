//! Types exchanged across layer boundaries

pub mod response;

pub use response::ApiResult;
