//! Unified Error Handling
//!
//! Application-wide error type and response envelope. Guard violations and
//! authorization failures are returned as structured user-facing responses;
//! store and internal failures are logged and collapsed into generic
//! messages.
//!
//! Error code ranges:
//!
//! | Prefix | Category | Example |
//! |--------|----------|---------|
//! | E0xxx  | Request errors | E0002 validation, E0003 not found |
//! | E1xxx  | Marketplace guards | E1001 already sold, E1003 insufficient balance |
//! | E2xxx  | Authorization | E2001 permission denied |
//! | E3xxx  | Authentication | E3001 login required |
//! | E9xxx  | System errors | E9001 internal, E9003 store unavailable |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shared::AppResponse;
use tracing::error;

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Authentication / Authorization ==========
    #[error("Authentication required")]
    Unauthorized,

    #[error("Session expired")]
    SessionExpired,

    #[error("Permission denied: {0}")]
    Forbidden(String),

    // ========== Request Errors ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // ========== Marketplace Guards ==========
    #[error("Item already sold: {0}")]
    AlreadySold(String),

    #[error("Charge key already used: {0}")]
    AlreadyUsed(String),

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Buyer {0} is not reachable")]
    Unreachable(i64),

    // ========== System Errors ==========
    #[error("Store unavailable: {0}")]
    Store(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // Authentication errors (401)
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "E3001", "Please login first".to_string()),
            AppError::SessionExpired => (StatusCode::UNAUTHORIZED, "E3003", "Session expired".to_string()),

            // Authorization errors (403)
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "E2001", msg.clone()),

            // Not found (404)
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.clone()),

            // Validation (400)
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.clone()),

            // Conflict (409)
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "E0004", msg.clone()),

            // Marketplace guards
            AppError::AlreadySold(msg) => (StatusCode::CONFLICT, "E1001", format!("Already sold: {msg}")),
            AppError::AlreadyUsed(msg) => (StatusCode::CONFLICT, "E1002", format!("Charge key already used: {msg}")),
            AppError::InsufficientBalance => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "E1003",
                "Insufficient balance".to_string(),
            ),
            AppError::Unreachable(user_id) => {
                error!(target: "orders", user_id, "buyer unreachable, purchase aborted");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "E1004",
                    "Buyer cannot receive messages, start the bot first".to_string(),
                )
            }

            // Store errors (503) - the caller should retry later
            AppError::Store(msg) => {
                error!(target: "store", error = %msg, "store operation failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "E9003",
                    "Store unavailable, try again later".to_string(),
                )
            }

            // Internal errors (500)
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(AppResponse::<()>::error(code, message));
        (status, body).into_response()
    }
}

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<AppResponse<T>> {
    Json(AppResponse::success(data))
}

/// Create a successful response with custom message
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<AppResponse<T>> {
    Json(AppResponse::success_with_message(data, message))
}
