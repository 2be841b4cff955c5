//! Request context extractor
//!
//! Reads the tenant from `x-merchant-id` and the acting staff member, if
//! any, from `x-user-id`.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::AppError;

use crate::orders::RequestContext;

pub const MERCHANT_ID_HEADER: &str = "x-merchant-id";
pub const USER_ID_HEADER: &str = "x-user-id";

fn header_id(parts: &Parts, name: &str) -> Result<Option<i64>, AppError> {
    let Some(value) = parts.headers.get(name) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map(Some)
        .ok_or_else(|| AppError::invalid_request(format!("Malformed {name} header")))
}

impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let merchant_id = header_id(parts, MERCHANT_ID_HEADER)?.ok_or_else(|| {
            AppError::invalid_request(format!("Missing {MERCHANT_ID_HEADER} header"))
        })?;
        let user_id = header_id(parts, USER_ID_HEADER)?;
        Ok(RequestContext::new(merchant_id, user_id))
    }
}

/// Parse a string-encoded id from the path
pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::invalid_request(format!("Invalid id: {raw}")))
}
