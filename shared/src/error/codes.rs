//! Unified error codes for the order engine
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Catalog / stock errors
//! - 7xxx: Discount errors
//! - 9xxx: System errors
//!
//! The numeric value drives categorisation and HTTP mapping; clients only
//! ever see the SCREAMING_SNAKE name (e.g. `INSUFFICIENT_STOCK`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unified error code enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Malformed or missing input
    ValidationError = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order type is not one of DINE_IN / TAKEAWAY / DELIVERY
    InvalidOrderType = 4002,
    /// Edit request changes the order type
    OrderTypeMismatch = 4003,
    /// Merchant does not serve this order type right now
    OrderTypeUnavailable = 4004,
    /// Order cannot be edited in its current state
    OrderNotEditable = 4005,
    /// Merchant has disabled order editing
    OrderEditDisabled = 4006,
    /// Order has no items
    OrderEmpty = 4007,
    /// Delivery order completed before being delivered
    DeliveryNotCompleted = 4008,

    // ==================== 5xxx: Payment ====================
    /// Payment already completed
    PaymentAlreadyCompleted = 5001,

    // ==================== 6xxx: Catalog ====================
    /// Catalog item not found
    ItemNotFound = 6001,
    /// Catalog item inactive or deleted
    ItemUnavailable = 6002,
    /// Not enough stock for the requested quantity
    InsufficientStock = 6003,
    /// Ad-hoc item rejected
    InvalidCustomItem = 6004,

    // ==================== 7xxx: Discount ====================
    /// Voucher rejected by the voucher service
    VoucherRejected = 7001,
    /// Discount payload invalid
    InvalidDiscount = 7002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Client-facing code string
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Success => "SUCCESS",
            ErrorCode::Unknown => "UNKNOWN",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::RequiredField => "REQUIRED_FIELD",
            ErrorCode::ValueOutOfRange => "VALUE_OUT_OF_RANGE",
            ErrorCode::OrderNotFound => "ORDER_NOT_FOUND",
            ErrorCode::InvalidOrderType => "INVALID_ORDER_TYPE",
            ErrorCode::OrderTypeMismatch => "ORDER_TYPE_MISMATCH",
            ErrorCode::OrderTypeUnavailable => "ORDER_TYPE_UNAVAILABLE",
            ErrorCode::OrderNotEditable => "ORDER_NOT_EDITABLE",
            ErrorCode::OrderEditDisabled => "ORDER_EDIT_DISABLED",
            ErrorCode::OrderEmpty => "ORDER_EMPTY",
            ErrorCode::DeliveryNotCompleted => "DELIVERY_NOT_COMPLETED",
            ErrorCode::PaymentAlreadyCompleted => "PAYMENT_ALREADY_COMPLETED",
            ErrorCode::ItemNotFound => "ITEM_NOT_FOUND",
            ErrorCode::ItemUnavailable => "ITEM_UNAVAILABLE",
            ErrorCode::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorCode::InvalidCustomItem => "INVALID_CUSTOM_ITEM",
            ErrorCode::VoucherRejected => "VOUCHER_REJECTED",
            ErrorCode::InvalidDiscount => "INVALID_DISCOUNT",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
        }
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationError => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::InvalidOrderType => "Invalid order type",
            ErrorCode::OrderTypeMismatch => "Order type cannot be changed",
            ErrorCode::OrderTypeUnavailable => "Order type is not available right now",
            ErrorCode::OrderNotEditable => "Order cannot be edited",
            ErrorCode::OrderEditDisabled => "Order editing is disabled for this merchant",
            ErrorCode::OrderEmpty => "Order has no items",
            ErrorCode::DeliveryNotCompleted => "Delivery has not been completed",

            ErrorCode::PaymentAlreadyCompleted => "Payment has already been completed",

            ErrorCode::ItemNotFound => "Item not found",
            ErrorCode::ItemUnavailable => "Item is not available",
            ErrorCode::InsufficientStock => "Insufficient stock",
            ErrorCode::InvalidCustomItem => "Invalid custom item",

            ErrorCode::VoucherRejected => "Voucher cannot be applied",
            ErrorCode::InvalidDiscount => "Invalid discount",

            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when parsing an unknown error code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidErrorCode(pub String);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        ALL_CODES
            .iter()
            .copied()
            .find(|c| c.code() == value)
            .ok_or_else(|| InvalidErrorCode(value.to_string()))
    }
}

impl FromStr for ErrorCode {
    type Err = InvalidErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_CODES
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| InvalidErrorCode(s.to_string()))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const ALL_CODES: &[ErrorCode] = &[
    ErrorCode::Success,
    ErrorCode::Unknown,
    ErrorCode::ValidationError,
    ErrorCode::NotFound,
    ErrorCode::InvalidRequest,
    ErrorCode::RequiredField,
    ErrorCode::ValueOutOfRange,
    ErrorCode::OrderNotFound,
    ErrorCode::InvalidOrderType,
    ErrorCode::OrderTypeMismatch,
    ErrorCode::OrderTypeUnavailable,
    ErrorCode::OrderNotEditable,
    ErrorCode::OrderEditDisabled,
    ErrorCode::OrderEmpty,
    ErrorCode::DeliveryNotCompleted,
    ErrorCode::PaymentAlreadyCompleted,
    ErrorCode::ItemNotFound,
    ErrorCode::ItemUnavailable,
    ErrorCode::InsufficientStock,
    ErrorCode::InvalidCustomItem,
    ErrorCode::VoucherRejected,
    ErrorCode::InvalidDiscount,
    ErrorCode::InternalError,
    ErrorCode::DatabaseError,
    ErrorCode::ConfigError,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationError.code(), 2);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::InsufficientStock.code(), 6003);
        assert_eq!(ErrorCode::VoucherRejected.code(), 7001);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_serde_name_matches_as_str() {
        for code in ALL_CODES {
            let json = serde_json::to_string(code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
            let back: ErrorCode = serde_json::from_str(&json).unwrap();
            assert_eq!(back, *code);
        }
    }

    #[test]
    fn test_try_from_u16() {
        assert_eq!(ErrorCode::try_from(6003), Ok(ErrorCode::InsufficientStock));
        assert!(ErrorCode::try_from(4242).is_err());
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "ORDER_TYPE_MISMATCH".parse::<ErrorCode>(),
            Ok(ErrorCode::OrderTypeMismatch)
        );
        assert!("NOPE".parse::<ErrorCode>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::ValidationError.to_string(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::InternalError.is_success());
    }
}
