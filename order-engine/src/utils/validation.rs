//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement.

use crate::orders::OrderError;

// ── Text length limits ──────────────────────────────────────────────

/// Table numbers / labels
pub const MAX_TABLE_NUMBER_LEN: usize = 20;

/// Notes (order note, line note)
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone, voucher code, etc.
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Entity names: customer name, discount label
pub const MAX_NAME_LEN: usize = 200;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

// ── Validation helpers (order operations) ───────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), OrderError> {
    if value.trim().is_empty() {
        return Err(OrderError::Validation(format!("{field} must not be empty")));
    }
    validate_text(value, field, max_len)
}

/// Validate that a string is within the length limit (counted in chars).
pub fn validate_text(value: &str, field: &str, max_len: usize) -> Result<(), OrderError> {
    let len = value.chars().count();
    if len > max_len {
        return Err(OrderError::Validation(format!(
            "{field} is too long ({len} chars, max {max_len})"
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), OrderError> {
    if let Some(v) = value {
        validate_text(v, field, max_len)?;
    }
    Ok(())
}

/// Trim and drop empty strings
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
