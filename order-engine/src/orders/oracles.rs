//! External collaborators consulted by the order engine
//!
//! The voucher library and the availability rules (geofencing, opening
//! hours) live outside this crate; the engine only sees these traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::models::{DiscountType, OrderType};
use thiserror::Error;

/// Identifies a voucher to the voucher service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherKey {
    pub template_id: Option<i64>,
    pub code: Option<String>,
}

impl VoucherKey {
    pub fn is_empty(&self) -> bool {
        self.template_id.is_none() && self.code.as_deref().is_none_or(|c| c.trim().is_empty())
    }

    /// Human-readable name used in error messages
    pub fn display_name(&self) -> String {
        match (&self.code, self.template_id) {
            (Some(code), _) => code.clone(),
            (None, Some(id)) => format!("#{id}"),
            (None, None) => "voucher".to_string(),
        }
    }
}

/// Order line as the voucher service sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherLine {
    pub menu_item_id: Option<i64>,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i64,
    pub subtotal: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherRequest {
    pub merchant_id: i64,
    pub customer_id: Option<i64>,
    pub key: VoucherKey,
    pub subtotal: f64,
    pub items: Vec<VoucherLine>,
    /// Order whose own prior usage must not count against usage limits
    pub exclude_order_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherQuote {
    pub label: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub amount: f64,
    /// Part of the subtotal the voucher applies to
    pub eligible_subtotal: f64,
    pub max_discount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{reason}")]
pub struct VoucherRejection {
    pub name: String,
    pub reason: String,
}

#[async_trait]
pub trait VoucherOracle: Send + Sync {
    async fn quote(&self, request: VoucherRequest) -> Result<VoucherQuote, VoucherRejection>;
}

#[async_trait]
pub trait AvailabilityOracle: Send + Sync {
    /// Whether the merchant accepts `order_type` orders at `at_millis`
    async fn is_mode_available(&self, merchant_id: i64, order_type: OrderType, at_millis: i64)
    -> bool;
}

/// Rejects every voucher; used when no voucher service is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVouchers;

#[async_trait]
impl VoucherOracle for NoVouchers {
    async fn quote(&self, request: VoucherRequest) -> Result<VoucherQuote, VoucherRejection> {
        Err(VoucherRejection {
            name: request.key.display_name(),
            reason: "vouchers are not enabled".to_string(),
        })
    }
}

/// Every mode is always open
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAvailable;

#[async_trait]
impl AvailabilityOracle for AlwaysAvailable {
    async fn is_mode_available(&self, _merchant_id: i64, _order_type: OrderType, _at: i64) -> bool {
        true
    }
}
