//! Order State Machine
//!
//! ```text
//! PENDING ──► ACCEPTED ──► IN_PROGRESS ──► READY ──► COMPLETED
//!    │            │             │            │
//!    └────────────┴─────────────┴────────────┴──► CANCELLED
//! ```
//!
//! Planning is pure: [`plan_transition`] decides what a status change
//! implies (delivery force, payment completion, deferred stock deduction,
//! cancellation restock) and the service executes the plan in one
//! transaction.

use shared::models::{DeliveryStatus, Order, OrderStatus, OrderType, Payment};
use shared::order::ChangeStatusRequest;

use super::error::{OrderError, OrderResult};

/// Next step on the happy path
const fn forward_step(from: OrderStatus) -> Option<OrderStatus> {
    use OrderStatus::*;
    match from {
        Pending => Some(Accepted),
        Accepted => Some(InProgress),
        InProgress => Some(Ready),
        Ready => Some(Completed),
        Completed | Cancelled => None,
    }
}

/// Terminal orders never move; anything else may advance one step or cancel
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    !from.is_terminal() && (to == OrderStatus::Cancelled || forward_step(from) == Some(to))
}

pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> OrderResult<()> {
    if from == to {
        return Err(OrderError::Validation(format!("Order is already {to}")));
    }
    if !can_transition(from, to) {
        return Err(OrderError::illegal_transition(from, to));
    }
    Ok(())
}

/// Side effects that go with a status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPlan {
    pub from: OrderStatus,
    pub to: OrderStatus,
    /// Force delivery sub-status to DELIVERED in the same write
    pub force_delivered: bool,
    /// Complete (or create and complete) the payment
    pub complete_payment: bool,
    /// Scheduled order accepted: take its stock out now
    pub deduct_stock: bool,
    /// Deducted order cancelled: put its stock back
    pub restock: bool,
}

pub fn plan_transition(
    order: &Order,
    payment: Option<&Payment>,
    request: &ChangeStatusRequest,
) -> OrderResult<TransitionPlan> {
    let (from, to) = (order.status, request.status);
    validate_transition(from, to)?;

    let mut force_delivered = false;
    if to == OrderStatus::Completed
        && order.order_type == OrderType::Delivery
        && order.delivery_status != Some(DeliveryStatus::Delivered)
    {
        if !request.force_delivered {
            return Err(OrderError::DeliveryNotCompleted);
        }
        force_delivered = true;
    }

    let payment_done = payment.is_some_and(Payment::is_completed);
    let complete_payment = to == OrderStatus::Completed
        && (from == OrderStatus::Ready || request.force_mark_paid)
        && !payment_done;

    let deduct_stock =
        from == OrderStatus::Pending && to == OrderStatus::Accepted && order.awaits_stock_deduction();

    let restock = to == OrderStatus::Cancelled && order.stock_deducted_at.is_some();

    Ok(TransitionPlan {
        from,
        to,
        force_delivered,
        complete_payment,
        deduct_stock,
        restock,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{PaymentMethod, PaymentStatus};

    const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Accepted,
        OrderStatus::InProgress,
        OrderStatus::Ready,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    fn order(order_type: OrderType, status: OrderStatus) -> Order {
        Order {
            id: 1,
            merchant_id: 1,
            customer_id: None,
            customer_name: None,
            customer_phone: None,
            order_type,
            status,
            table_number: None,
            is_scheduled: false,
            scheduled_at: None,
            delivery_address: None,
            delivery_status: (order_type == OrderType::Delivery).then_some(DeliveryStatus::PickedUp),
            delivered_at: None,
            subtotal: 10.0,
            tax_amount: 0.0,
            service_charge_amount: 0.0,
            packaging_fee_amount: 0.0,
            delivery_fee_amount: 0.0,
            discount_amount: 0.0,
            total_amount: 10.0,
            payment_method_hint: None,
            notes: None,
            stock_deducted_at: Some(1),
            edited_at: None,
            edited_by: None,
            created_at: 1,
            updated_at: 1,
            version: 0,
        }
    }

    fn request(status: OrderStatus) -> ChangeStatusRequest {
        ChangeStatusRequest {
            status,
            force_delivered: false,
            force_mark_paid: false,
        }
    }

    #[test]
    fn test_transition_table() {
        let legal = [
            (OrderStatus::Pending, OrderStatus::Accepted),
            (OrderStatus::Pending, OrderStatus::Cancelled),
            (OrderStatus::Accepted, OrderStatus::InProgress),
            (OrderStatus::Accepted, OrderStatus::Cancelled),
            (OrderStatus::InProgress, OrderStatus::Ready),
            (OrderStatus::InProgress, OrderStatus::Cancelled),
            (OrderStatus::Ready, OrderStatus::Completed),
            (OrderStatus::Ready, OrderStatus::Cancelled),
        ];
        for from in ALL {
            for to in ALL {
                let expected = legal.contains(&(from, to));
                assert_eq!(can_transition(from, to), expected, "{from} -> {to}");
                assert_eq!(validate_transition(from, to).is_ok(), expected, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_same_status_rejected() {
        let err = validate_transition(OrderStatus::Ready, OrderStatus::Ready).unwrap_err();
        assert_eq!(err.to_string(), "Order is already READY");
    }

    #[test]
    fn test_delivery_completion_requires_delivered() {
        let o = order(OrderType::Delivery, OrderStatus::Ready);
        let err = plan_transition(&o, None, &request(OrderStatus::Completed)).unwrap_err();
        assert!(matches!(err, OrderError::DeliveryNotCompleted));

        let mut forced = request(OrderStatus::Completed);
        forced.force_delivered = true;
        let plan = plan_transition(&o, None, &forced).unwrap();
        assert!(plan.force_delivered);
        assert!(plan.complete_payment);

        let mut delivered = o.clone();
        delivered.delivery_status = Some(DeliveryStatus::Delivered);
        let plan = plan_transition(&delivered, None, &request(OrderStatus::Completed)).unwrap();
        assert!(!plan.force_delivered);
    }

    #[test]
    fn test_completed_payment_is_left_alone() {
        let o = order(OrderType::DineIn, OrderStatus::Ready);
        let paid = Payment {
            id: 5,
            order_id: 1,
            amount: 10.0,
            method: PaymentMethod::Card,
            status: PaymentStatus::Completed,
            paid_at: Some(3),
            paid_by: Some(4),
            created_at: 1,
            updated_at: 3,
        };
        let plan = plan_transition(&o, Some(&paid), &request(OrderStatus::Completed)).unwrap();
        assert!(!plan.complete_payment);
    }

    #[test]
    fn test_scheduled_acceptance_deducts_once() {
        let mut o = order(OrderType::Takeaway, OrderStatus::Pending);
        o.is_scheduled = true;
        o.stock_deducted_at = None;
        let plan = plan_transition(&o, None, &request(OrderStatus::Accepted)).unwrap();
        assert!(plan.deduct_stock);

        o.stock_deducted_at = Some(9);
        let plan = plan_transition(&o, None, &request(OrderStatus::Accepted)).unwrap();
        assert!(!plan.deduct_stock);
    }

    #[test]
    fn test_cancel_restocks_only_deducted_orders() {
        let mut o = order(OrderType::DineIn, OrderStatus::Accepted);
        assert!(plan_transition(&o, None, &request(OrderStatus::Cancelled)).unwrap().restock);
        o.stock_deducted_at = None;
        assert!(!plan_transition(&o, None, &request(OrderStatus::Cancelled)).unwrap().restock);
    }
}
