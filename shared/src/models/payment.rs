//! Payment Model

use serde::{Deserialize, Serialize};

use super::OrderType;

/// Payment method
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentMethod {
    Cash,
    Card,
    EWallet,
    BankTransfer,
    CashOnDelivery,
}

impl PaymentMethod {
    /// Method recorded when a payment is auto-created on completion and
    /// nobody told us how the customer paid
    pub const fn default_for(order_type: OrderType) -> Self {
        match order_type {
            OrderType::Delivery => Self::CashOnDelivery,
            OrderType::DineIn | OrderType::Takeaway => Self::Cash,
        }
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
}

/// Payment row (one per order)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payment {
    #[serde(with = "crate::util::id_string")]
    pub id: i64,
    #[serde(with = "crate::util::id_string")]
    pub order_id: i64,
    pub amount: f64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub paid_at: Option<i64>,
    #[serde(with = "crate::util::opt_id_string")]
    pub paid_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Payment {
    pub fn is_completed(&self) -> bool {
        self.status == PaymentStatus::Completed
    }
}
