//! Order Models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderType {
    DineIn,
    Takeaway,
    Delivery,
}

impl OrderType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DineIn => "DINE_IN",
            Self::Takeaway => "TAKEAWAY",
            Self::Delivery => "DELIVERY",
        }
    }
}

impl FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DINE_IN" => Ok(Self::DineIn),
            "TAKEAWAY" => Ok(Self::Takeaway),
            "DELIVERY" => Ok(Self::Delivery),
            other => Err(format!("unknown order type: {other}")),
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order status
///
/// `PENDING → ACCEPTED → IN_PROGRESS → READY → COMPLETED`, with `CANCELLED`
/// reachable from every non-terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderStatus {
    Pending,
    Accepted,
    InProgress,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Ready => "READY",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery sub-status (delivery orders only)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum DeliveryStatus {
    Pending,
    Assigned,
    PickedUp,
    Delivered,
}

/// Order row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    #[serde(with = "crate::util::id_string")]
    pub id: i64,
    #[serde(with = "crate::util::id_string")]
    pub merchant_id: i64,
    #[serde(with = "crate::util::opt_id_string")]
    pub customer_id: Option<i64>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub table_number: Option<String>,
    pub is_scheduled: bool,
    /// Scheduled fulfilment time (Unix millis)
    pub scheduled_at: Option<i64>,
    pub delivery_address: Option<String>,
    pub delivery_status: Option<DeliveryStatus>,
    pub delivered_at: Option<i64>,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub service_charge_amount: f64,
    pub packaging_fee_amount: f64,
    pub delivery_fee_amount: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
    pub payment_method_hint: Option<super::PaymentMethod>,
    pub notes: Option<String>,
    /// Null until stock for this order has left inventory
    pub stock_deducted_at: Option<i64>,
    pub edited_at: Option<i64>,
    #[serde(with = "crate::util::opt_id_string")]
    pub edited_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    /// Bumped by every write to the row; edits compare-and-set on it
    pub version: i64,
}

impl Order {
    /// Scheduled order whose stock has not been taken out yet
    pub fn awaits_stock_deduction(&self) -> bool {
        self.is_scheduled && self.stock_deducted_at.is_none()
    }
}

/// Order line row
///
/// `menu_item_id` is `None` for ad-hoc (custom) lines, which never touch
/// inventory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    #[serde(with = "crate::util::id_string")]
    pub id: i64,
    #[serde(with = "crate::util::id_string")]
    pub order_id: i64,
    #[serde(with = "crate::util::opt_id_string")]
    pub menu_item_id: Option<i64>,
    pub is_custom: bool,
    /// Name snapshot at order time
    pub name: String,
    /// Unit price snapshot at order time
    pub unit_price: f64,
    pub quantity: i64,
    pub subtotal: f64,
    pub notes: Option<String>,
}

/// Add-on attached to an order line
///
/// `quantity` is per unit of the parent line; stock consumption is
/// `quantity × parent quantity`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItemAddon {
    #[serde(with = "crate::util::id_string")]
    pub id: i64,
    #[serde(with = "crate::util::id_string")]
    pub order_item_id: i64,
    #[serde(with = "crate::util::id_string")]
    pub addon_item_id: i64,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i64,
    pub subtotal: f64,
}
