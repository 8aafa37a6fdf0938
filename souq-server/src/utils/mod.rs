//! Utility module - common helpers and types
//!
//! - [`AppError`] / [`AppResult`] - unified error handling at the HTTP boundary
//! - [`logger`] - tracing setup
//! - [`token`] - charge-key and verification code generation

pub mod error;
pub mod logger;
pub mod result;
pub mod token;

pub use error::{AppError, ok, ok_with_message};
pub use result::AppResult;
pub use shared::AppResponse;
