//! Unified error system
//!
//! - [`ErrorCode`]: Standardized error codes, serialized as stable strings
//! - [`ErrorCategory`]: Classification of errors by code range
//! - [`AppError`]: Rich error type with code, message, and details
//! - [`ApiResponse`]: Unified API response envelope
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::with_message(ErrorCode::InsufficientStock, "Insufficient stock for Iced Tea")
//!     .with_detail("item", "Iced Tea");
//! assert_eq!(err.code.http_status().as_u16(), 409);
//!
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.code.as_str(), "INSUFFICIENT_STOCK");
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError};
