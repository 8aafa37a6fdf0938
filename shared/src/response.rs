//! Unified API response envelope
//!
//! ```json
//! {
//!   "code": "E0000",
//!   "message": "Success",
//!   "data": { ... }
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Unified API response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppResponse<T> {
    /// Error code ("E0000" means success)
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> AppResponse<T> {
    /// Create a successful response
    pub fn success(data: T) -> Self {
        Self {
            code: "E0000".to_string(),
            message: "Success".to_string(),
            data: Some(data),
        }
    }

    /// Create a successful response with custom message
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            code: "E0000".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }

    /// Create an error response
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: None,
        }
    }
}
