//! API response envelope

use serde::{Deserialize, Serialize};

use crate::errors::{codes, ErrorCatalog};

/// Uniform JSON body returned by every endpoint.
///
/// `code` is `0` on success and a catalog code otherwise; `message` is resolved
/// through the [`ErrorCatalog`] so deployments can reword it without a rebuild.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResult<T> {
    pub code: u32,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResult<T> {
    /// Create a result with an explicit code and message
    pub fn new(code: u32, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }

    /// Create a successful result carrying `data`
    pub fn success(catalog: &ErrorCatalog, data: T) -> Self {
        Self::new(codes::SUCCESS, catalog.message(codes::SUCCESS), Some(data))
    }

    /// Check if the result is successful
    pub fn is_success(&self) -> bool {
        self.code == codes::SUCCESS
    }
}

impl ApiResult<()> {
    /// Create a failed result whose message is looked up in the catalog
    pub fn failure(catalog: &ErrorCatalog, code: u32) -> Self {
        Self::new(code, catalog.message(code), None)
    }
}
