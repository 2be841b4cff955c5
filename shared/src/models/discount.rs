//! Order Discount Model

use serde::{Deserialize, Serialize};

/// Where a discount came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum DiscountSource {
    /// Typed in by staff
    Manual,
    /// Voucher applied at the point of sale
    PosVoucher,
    /// Voucher applied by the customer when ordering
    CustomerVoucher,
}

impl DiscountSource {
    pub const fn is_voucher(&self) -> bool {
        matches!(self, Self::PosVoucher | Self::CustomerVoucher)
    }
}

/// Discount type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum DiscountType {
    /// `value` is a percentage (10 = 10%)
    Percentage,
    /// `value` is a currency amount
    FixedAmount,
}

/// Discount recorded against an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderDiscount {
    #[serde(with = "crate::util::id_string")]
    pub id: i64,
    #[serde(with = "crate::util::id_string")]
    pub order_id: i64,
    pub source: DiscountSource,
    pub label: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub amount: f64,
    #[serde(with = "crate::util::opt_id_string")]
    pub voucher_template_id: Option<i64>,
    pub voucher_code: Option<String>,
    /// Staff override of the voucher value, re-applied on every recompute
    pub override_value: Option<f64>,
    pub created_at: i64,
}
