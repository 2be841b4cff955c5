//! Order request payloads (as received from HTTP handlers)

use serde::{Deserialize, Serialize};

use crate::models::{DeliveryStatus, DiscountSource, DiscountType, OrderStatus, PaymentMethod};

fn default_quantity() -> i64 {
    1
}

/// Ad-hoc line that bypasses the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomItemInput {
    pub name: String,
    pub price: f64,
}

/// Add-on selection on a line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddonInput {
    #[serde(with = "crate::util::id_string")]
    pub addon_item_id: i64,
    /// Per unit of the parent line
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

/// Requested order line: either a catalog reference or a custom payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItemInput {
    #[serde(default, with = "crate::util::opt_id_string")]
    pub menu_item_id: Option<i64>,
    #[serde(default)]
    pub custom: Option<CustomItemInput>,
    pub quantity: i64,
    #[serde(default)]
    pub addons: Vec<AddonInput>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl OrderItemInput {
    /// Catalog line helper
    pub fn catalog(menu_item_id: i64, quantity: i64) -> Self {
        Self {
            menu_item_id: Some(menu_item_id),
            custom: None,
            quantity,
            addons: Vec::new(),
            notes: None,
        }
    }

    /// Custom line helper
    pub fn custom(name: impl Into<String>, price: f64, quantity: i64) -> Self {
        Self {
            menu_item_id: None,
            custom: Some(CustomItemInput {
                name: name.into(),
                price,
            }),
            quantity,
            addons: Vec::new(),
            notes: None,
        }
    }

    pub fn with_addon(mut self, addon_item_id: i64, quantity: i64) -> Self {
        self.addons.push(AddonInput {
            addon_item_id,
            quantity,
        });
        self
    }
}

/// Customer details attached to an order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomerInput {
    #[serde(default, with = "crate::util::opt_id_string")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Identifies a voucher for the voucher service
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VoucherInput {
    #[serde(default, with = "crate::util::opt_id_string")]
    pub template_id: Option<i64>,
    #[serde(default)]
    pub code: Option<String>,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateOrderRequest {
    /// Parsed server-side so that unknown values map to `INVALID_ORDER_TYPE`
    pub order_type: String,
    #[serde(default)]
    pub table_number: Option<String>,
    pub items: Vec<OrderItemInput>,
    #[serde(default)]
    pub customer: Option<CustomerInput>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    /// Unix millis; present means the order is scheduled
    #[serde(default)]
    pub scheduled_at: Option<i64>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub voucher: Option<VoucherInput>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Edit order payload: the item list fully replaces the current one
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EditOrderRequest {
    pub order_type: String,
    #[serde(default)]
    pub table_number: Option<String>,
    pub items: Vec<OrderItemInput>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Status change payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangeStatusRequest {
    pub status: OrderStatus,
    /// Complete a delivery order even if the courier has not marked it delivered
    #[serde(default)]
    pub force_delivered: bool,
    /// Mark the payment paid on completion regardless of the prior status
    #[serde(default)]
    pub force_mark_paid: bool,
}

/// POS discount payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplyDiscountRequest {
    pub source: DiscountSource,
    #[serde(default)]
    pub label: Option<String>,
    /// Required for `MANUAL`
    #[serde(default)]
    pub discount_type: Option<DiscountType>,
    /// Required for `MANUAL`
    #[serde(default)]
    pub value: Option<f64>,
    /// Required for voucher sources
    #[serde(default)]
    pub voucher: Option<VoucherInput>,
    /// Staff override of a voucher's value
    #[serde(default)]
    pub override_value: Option<f64>,
}

/// Delivery sub-status update payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryStatusRequest {
    pub status: DeliveryStatus,
}
