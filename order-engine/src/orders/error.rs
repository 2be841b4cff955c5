//! Order engine error type
//!
//! `OrderError` is what the order operations return. Converting it into
//! [`AppError`] keeps business rejections as-is and collapses
//! infrastructure failures into `INTERNAL_ERROR` after logging them.

use shared::error::{AppError, ErrorCode};
use shared::models::{OrderStatus, OrderType};
use thiserror::Error;

use crate::db::repository::RepoError;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid order type: {0}")]
    InvalidOrderType(String),

    #[error("Order type cannot change from {from} to {to}")]
    OrderTypeMismatch { from: OrderType, to: OrderType },

    #[error("{0} orders are not available right now")]
    OrderTypeUnavailable(OrderType),

    #[error("Order {0} not found")]
    OrderNotFound(i64),

    #[error("Merchant {0} not found")]
    MerchantNotFound(i64),

    #[error("{0}")]
    NotEditable(String),

    #[error("Order editing is disabled for this merchant")]
    EditDisabled,

    #[error("Order must contain at least one item")]
    Empty,

    #[error("Delivery has not been completed yet")]
    DeliveryNotCompleted,

    #[error("Payment for order {0} is already completed")]
    PaymentAlreadyCompleted(i64),

    #[error("Item {0} not found")]
    ItemNotFound(i64),

    #[error("{0} is not available")]
    ItemUnavailable(String),

    #[error("Insufficient stock for {name}")]
    InsufficientStock { name: String },

    #[error("{0}")]
    InvalidCustomItem(String),

    #[error("{0}")]
    InvalidDiscount(String),

    #[error("Voucher {name} rejected: {reason}")]
    VoucherRejected { name: String, reason: String },

    #[error("Order {id} changed while it was being updated")]
    Conflict { id: i64 },

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl OrderError {
    pub fn insufficient_stock(name: impl Into<String>) -> Self {
        Self::InsufficientStock { name: name.into() }
    }

    pub fn illegal_transition(from: OrderStatus, to: OrderStatus) -> Self {
        Self::Validation(format!("Cannot transition order from {from} to {to}"))
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::InvalidOrderType(_) => ErrorCode::InvalidOrderType,
            Self::OrderTypeMismatch { .. } => ErrorCode::OrderTypeMismatch,
            Self::OrderTypeUnavailable(_) => ErrorCode::OrderTypeUnavailable,
            Self::OrderNotFound(_) => ErrorCode::OrderNotFound,
            Self::MerchantNotFound(_) => ErrorCode::NotFound,
            Self::NotEditable(_) | Self::Conflict { .. } => ErrorCode::OrderNotEditable,
            Self::EditDisabled => ErrorCode::OrderEditDisabled,
            Self::Empty => ErrorCode::OrderEmpty,
            Self::DeliveryNotCompleted => ErrorCode::DeliveryNotCompleted,
            Self::PaymentAlreadyCompleted(_) => ErrorCode::PaymentAlreadyCompleted,
            Self::ItemNotFound(_) => ErrorCode::ItemNotFound,
            Self::ItemUnavailable(_) => ErrorCode::ItemUnavailable,
            Self::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            Self::InvalidCustomItem(_) => ErrorCode::InvalidCustomItem,
            Self::InvalidDiscount(_) => ErrorCode::InvalidDiscount,
            Self::VoucherRejected { .. } => ErrorCode::VoucherRejected,
            Self::Repo(RepoError::NotFound(_)) => ErrorCode::NotFound,
            Self::Repo(RepoError::Validation(_)) => ErrorCode::ValidationError,
            Self::Repo(_) | Self::Database(_) => ErrorCode::InternalError,
        }
    }

    /// Infrastructure failure (never shown to the caller verbatim)
    pub fn is_internal(&self) -> bool {
        self.code() == ErrorCode::InternalError
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        if err.is_internal() {
            tracing::error!(error = %err, "Order engine infrastructure error");
            return AppError::new(ErrorCode::InternalError);
        }
        let code = err.code();
        let app = AppError::with_message(code, err.to_string());
        match err {
            OrderError::InsufficientStock { name } => app.with_detail("item", name),
            OrderError::VoucherRejected { name, .. } => app.with_detail("voucher", name),
            OrderError::OrderNotFound(id) => app.with_detail("order_id", id.to_string()),
            OrderError::ItemNotFound(id) => app.with_detail("item_id", id.to_string()),
            _ => app,
        }
    }
}

pub type OrderResult<T> = Result<T, OrderError>;
