//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::NotFound | Self::OrderNotFound | Self::ItemNotFound => StatusCode::NOT_FOUND,

            // 409: the request conflicts with the current order state
            Self::OrderNotEditable
            | Self::OrderTypeMismatch
            | Self::PaymentAlreadyCompleted
            | Self::InsufficientStock => StatusCode::CONFLICT,

            // 422: well-formed but rejected by a business rule
            Self::OrderTypeUnavailable
            | Self::OrderEditDisabled
            | Self::DeliveryNotCompleted
            | Self::ItemUnavailable
            | Self::VoucherRejected => StatusCode::UNPROCESSABLE_ENTITY,

            Self::InternalError | Self::DatabaseError | Self::ConfigError | Self::Unknown => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorCode::ValidationError.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::InvalidOrderType.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::OrderNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::InsufficientStock.http_status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::VoucherRejected.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorCode::InternalError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
