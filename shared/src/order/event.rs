//! Order lifecycle events published after a successful commit

use serde::{Deserialize, Serialize};

use crate::models::{OrderStatus, OrderType};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventKind {
    Created {
        order_type: OrderType,
        total_amount: f64,
    },
    Edited {
        total_amount: f64,
    },
    StatusChanged {
        from: OrderStatus,
        to: OrderStatus,
    },
    DiscountApplied {
        discount_amount: f64,
        total_amount: f64,
    },
    DeliveryUpdated {
        status: crate::models::DeliveryStatus,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderEvent {
    #[serde(with = "crate::util::id_string")]
    pub order_id: i64,
    #[serde(with = "crate::util::id_string")]
    pub merchant_id: i64,
    #[serde(flatten)]
    pub kind: OrderEventKind,
    pub timestamp: i64,
}

impl OrderEvent {
    pub fn new(order_id: i64, merchant_id: i64, kind: OrderEventKind) -> Self {
        Self {
            order_id,
            merchant_id,
            kind,
            timestamp: crate::util::now_millis(),
        }
    }

    /// Short event name used in log lines
    pub fn name(&self) -> &'static str {
        match self.kind {
            OrderEventKind::Created { .. } => "order.created",
            OrderEventKind::Edited { .. } => "order.edited",
            OrderEventKind::StatusChanged { .. } => "order.status_changed",
            OrderEventKind::DiscountApplied { .. } => "order.discount_applied",
            OrderEventKind::DeliveryUpdated { .. } => "order.delivery_updated",
        }
    }
}
