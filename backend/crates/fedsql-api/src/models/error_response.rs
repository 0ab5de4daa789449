//! Error body for REST endpoints

use serde::{Deserialize, Serialize};

use super::ErrorCode;

/// Error response body for non-SQL endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable code (e.g. "NOT_FOUND", "UNAUTHENTICATED")
    pub error_code: String,
    /// Human-readable error message
    pub error_message: String,
}

impl ErrorResponse {
    #[inline]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error_code: code.as_str().to_string(),
            error_message: message.into(),
        }
    }
}
