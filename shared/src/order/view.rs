//! Read model returned by the order endpoints

use serde::{Deserialize, Serialize};

use crate::models::{
    DeliveryStatus, Order, OrderDiscount, OrderItem, OrderItemAddon, OrderStatus, OrderType,
    Payment,
};

/// Order line with its add-ons
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItemView {
    #[serde(flatten)]
    pub item: OrderItem,
    pub addons: Vec<OrderItemAddon>,
}

/// Monetary breakdown
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TotalsView {
    pub subtotal: f64,
    pub tax: f64,
    pub service_charge: f64,
    pub packaging_fee: f64,
    pub delivery_fee: f64,
    pub discount: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerView {
    #[serde(with = "crate::util::opt_id_string")]
    pub id: Option<i64>,
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Present on scheduled orders only
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReservationView {
    pub scheduled_at: Option<i64>,
    pub stock_deducted: bool,
    pub stock_deducted_at: Option<i64>,
}

/// Present on delivery orders only
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryView {
    pub address: Option<String>,
    pub status: Option<DeliveryStatus>,
    pub delivered_at: Option<i64>,
}

/// Full order as seen by API clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderView {
    #[serde(with = "crate::util::id_string")]
    pub id: i64,
    #[serde(with = "crate::util::id_string")]
    pub merchant_id: i64,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub table_number: Option<String>,
    pub customer: Option<CustomerView>,
    pub items: Vec<OrderItemView>,
    pub discounts: Vec<OrderDiscount>,
    pub totals: TotalsView,
    pub payment: Option<Payment>,
    pub reservation: Option<ReservationView>,
    pub delivery: Option<DeliveryView>,
    pub notes: Option<String>,
    pub edited_at: Option<i64>,
    #[serde(with = "crate::util::opt_id_string")]
    pub edited_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl OrderView {
    /// Assemble the view from stored rows. Add-ons whose parent line is not
    /// in `items` are ignored.
    pub fn assemble(
        order: Order,
        items: Vec<OrderItem>,
        addons: Vec<OrderItemAddon>,
        discounts: Vec<OrderDiscount>,
        payment: Option<Payment>,
    ) -> Self {
        let mut item_views: Vec<OrderItemView> = items
            .into_iter()
            .map(|item| OrderItemView {
                item,
                addons: Vec::new(),
            })
            .collect();
        for addon in addons {
            if let Some(view) = item_views
                .iter_mut()
                .find(|v| v.item.id == addon.order_item_id)
            {
                view.addons.push(addon);
            }
        }

        let customer = (order.customer_id.is_some()
            || order.customer_name.is_some()
            || order.customer_phone.is_some())
        .then(|| CustomerView {
            id: order.customer_id,
            name: order.customer_name.clone(),
            phone: order.customer_phone.clone(),
        });

        let reservation = order.is_scheduled.then(|| ReservationView {
            scheduled_at: order.scheduled_at,
            stock_deducted: order.stock_deducted_at.is_some(),
            stock_deducted_at: order.stock_deducted_at,
        });

        let delivery = (order.order_type == OrderType::Delivery).then(|| DeliveryView {
            address: order.delivery_address.clone(),
            status: order.delivery_status,
            delivered_at: order.delivered_at,
        });

        Self {
            id: order.id,
            merchant_id: order.merchant_id,
            order_type: order.order_type,
            status: order.status,
            table_number: order.table_number,
            customer,
            items: item_views,
            discounts,
            totals: TotalsView {
                subtotal: order.subtotal,
                tax: order.tax_amount,
                service_charge: order.service_charge_amount,
                packaging_fee: order.packaging_fee_amount,
                delivery_fee: order.delivery_fee_amount,
                discount: order.discount_amount,
                total: order.total_amount,
            },
            payment,
            reservation,
            delivery,
            notes: order.notes,
            edited_at: order.edited_at,
            edited_by: order.edited_by,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}
