//! Order service
//!
//! Facade over the order engine. Each operation reads what it needs from
//! the pool, consults the external oracles, and then performs all of its
//! writes in a single transaction. Events are published after commit.

use std::sync::Arc;

use shared::models::{
    DeliveryStatus, DiscountSource, MerchantSettings, Order, OrderStatus, OrderType, Payment,
    PaymentMethod, PaymentStatus,
};
use shared::order::{
    ApplyDiscountRequest, ChangeStatusRequest, DeliveryStatusRequest, OrderEvent, OrderEventKind,
    OrderView,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

use super::discount::{self, DiscountContext};
use super::error::{OrderError, OrderResult};
use super::events::{EventPublisher, TracingPublisher, spawn_publish};
use super::inventory::{self, StockUsage};
use super::money::{compute_totals, round2, to_decimal, to_f64};
use super::oracles::{AlwaysAvailable, AvailabilityOracle, NoVouchers, VoucherKey, VoucherOracle};
use super::state_machine::plan_transition;
use crate::db::repository::{discount as discount_repo, merchant, order as order_repo, payment};
use crate::utils::validation::{MAX_NAME_LEN, validate_optional_text};

/// Who is calling: the merchant (tenant) and, for staff actions, the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    pub merchant_id: i64,
    pub user_id: Option<i64>,
}

impl RequestContext {
    pub fn new(merchant_id: i64, user_id: Option<i64>) -> Self {
        Self {
            merchant_id,
            user_id,
        }
    }
}

#[derive(Clone)]
pub struct OrderService {
    pub(super) pool: SqlitePool,
    pub(super) vouchers: Arc<dyn VoucherOracle>,
    pub(super) availability: Arc<dyn AvailabilityOracle>,
    pub(super) events: Arc<dyn EventPublisher>,
}

impl OrderService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            vouchers: Arc::new(NoVouchers),
            availability: Arc::new(AlwaysAvailable),
            events: Arc::new(TracingPublisher),
        }
    }

    pub fn with_voucher_oracle(mut self, oracle: Arc<dyn VoucherOracle>) -> Self {
        self.vouchers = oracle;
        self
    }

    pub fn with_availability_oracle(mut self, oracle: Arc<dyn AvailabilityOracle>) -> Self {
        self.availability = oracle;
        self
    }

    pub fn with_event_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.events = publisher;
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub(super) fn publish(&self, order: &Order, kind: OrderEventKind) {
        spawn_publish(&self.events, OrderEvent::new(order.id, order.merchant_id, kind));
    }

    /// Merchant settings; a malformed blob falls back to defaults
    pub(super) async fn load_settings(&self, merchant_id: i64) -> OrderResult<MerchantSettings> {
        let merchant = merchant::find_by_id(&self.pool, merchant_id)
            .await?
            .ok_or(OrderError::MerchantNotFound(merchant_id))?;
        match MerchantSettings::from_json(merchant.settings.as_deref()) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                tracing::warn!(merchant_id, error = %e, "Malformed merchant settings, using defaults");
                Ok(MerchantSettings::default())
            }
        }
    }

    pub(super) async fn load_order(&self, ctx: &RequestContext, order_id: i64) -> OrderResult<Order> {
        order_repo::find_by_id(&self.pool, ctx.merchant_id, order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))
    }

    /// Hydrated order
    pub async fn get_order(&self, ctx: &RequestContext, order_id: i64) -> OrderResult<OrderView> {
        let order = self.load_order(ctx, order_id).await?;
        let items = order_repo::find_items(&self.pool, order.id).await?;
        let addons = order_repo::find_addons(&self.pool, order.id).await?;
        let discounts = discount_repo::find_by_order(&self.pool, order.id).await?;
        let payment = payment::find_by_order(&self.pool, order.id).await?;
        Ok(OrderView::assemble(order, items, addons, discounts, payment))
    }

    /// Move an order to a new status, with everything the move implies
    pub async fn change_status(
        &self,
        ctx: &RequestContext,
        order_id: i64,
        request: ChangeStatusRequest,
    ) -> OrderResult<OrderView> {
        let order = self.load_order(ctx, order_id).await?;
        let existing_payment = payment::find_by_order(&self.pool, order.id).await?;
        let plan = plan_transition(&order, existing_payment.as_ref(), &request)?;
        let now = now_millis();

        let mut tx = self.pool.begin().await?;

        let delivered_at = plan.force_delivered.then_some(now);
        if !order_repo::update_status(&mut *tx, order.id, plan.from, plan.to, delivered_at, now)
            .await?
        {
            return Err(OrderError::Conflict { id: order.id });
        }

        if plan.deduct_stock || plan.restock {
            let items = order_repo::find_items(&mut *tx, order.id).await?;
            let addons = order_repo::find_addons(&mut *tx, order.id).await?;
            let usage = StockUsage::from_rows(&items, &addons);
            if plan.deduct_stock {
                inventory::apply(&mut *tx, &usage.as_deductions()).await?;
                order_repo::set_stock_deducted_at(&mut *tx, order.id, Some(now), now).await?;
                tracing::info!(order_id = order.id, "Scheduled order stock deducted");
            } else {
                inventory::apply(&mut *tx, &usage.as_returns()).await?;
                order_repo::set_stock_deducted_at(&mut *tx, order.id, None, now).await?;
                tracing::info!(order_id = order.id, "Cancelled order restocked");
            }
        }

        if plan.complete_payment {
            match &existing_payment {
                Some(_) => payment::mark_completed(&mut *tx, order.id, now, ctx.user_id).await?,
                None => {
                    let method = order
                        .payment_method_hint
                        .unwrap_or_else(|| PaymentMethod::default_for(order.order_type));
                    let new_payment = Payment {
                        id: snowflake_id(),
                        order_id: order.id,
                        amount: order.total_amount,
                        method,
                        status: PaymentStatus::Completed,
                        paid_at: Some(now),
                        paid_by: ctx.user_id,
                        created_at: now,
                        updated_at: now,
                    };
                    payment::insert(&mut *tx, &new_payment).await?;
                }
            }
        }

        tx.commit().await?;

        tracing::info!(
            order_id = order.id,
            merchant_id = order.merchant_id,
            from = %plan.from,
            to = %plan.to,
            "Order status changed"
        );
        self.publish(
            &order,
            OrderEventKind::StatusChanged {
                from: plan.from,
                to: plan.to,
            },
        );
        self.get_order(ctx, order.id).await
    }

    /// Attach a POS discount (manual or POS voucher) to an open order
    pub async fn apply_discount(
        &self,
        ctx: &RequestContext,
        order_id: i64,
        request: ApplyDiscountRequest,
    ) -> OrderResult<OrderView> {
        validate_optional_text(&request.label, "label", MAX_NAME_LEN)?;
        let order = self.load_order(ctx, order_id).await?;
        if !matches!(order.status, OrderStatus::Pending | OrderStatus::Accepted) {
            return Err(OrderError::NotEditable(format!(
                "Discounts cannot be applied to {} orders",
                order.status
            )));
        }
        let existing_payment = payment::find_by_order(&self.pool, order.id).await?;
        if existing_payment.as_ref().is_some_and(Payment::is_completed) {
            return Err(OrderError::PaymentAlreadyCompleted(order.id));
        }

        let new_discount = match request.source {
            DiscountSource::Manual => {
                let (Some(discount_type), Some(value)) = (request.discount_type, request.value)
                else {
                    return Err(OrderError::InvalidDiscount(
                        "Manual discounts need a discount type and value".into(),
                    ));
                };
                discount::manual_discount(
                    order.id,
                    request.label.clone(),
                    discount_type,
                    value,
                    order.subtotal,
                )?
            }
            DiscountSource::PosVoucher => {
                let voucher = request.voucher.clone().unwrap_or_default();
                let items = order_repo::find_items(&self.pool, order.id).await?;
                let dctx = DiscountContext {
                    merchant_id: order.merchant_id,
                    customer_id: order.customer_id,
                    order_id: order.id,
                    exclude_order_id: Some(order.id),
                    subtotal: order.subtotal,
                    items: &items,
                };
                let key = VoucherKey {
                    template_id: voucher.template_id,
                    code: voucher.code,
                };
                discount::voucher_discount(
                    self.vouchers.as_ref(),
                    dctx,
                    DiscountSource::PosVoucher,
                    key,
                    request.override_value,
                )
                .await?
            }
            DiscountSource::CustomerVoucher => {
                return Err(OrderError::InvalidDiscount(
                    "Customer vouchers can only be applied when the order is placed".into(),
                ));
            }
        };

        let discount_amount =
            to_f64(round2(to_decimal(order.discount_amount) + to_decimal(new_discount.amount)));
        let settings = self.load_settings(order.merchant_id).await?;
        let totals = compute_totals(
            order.subtotal,
            discount_amount,
            order.order_type,
            &settings,
            order.delivery_fee_amount,
        );
        let now = now_millis();
        let mut updated = Order {
            updated_at: now,
            ..order.clone()
        };
        totals.apply_to(&mut updated);

        let mut tx = self.pool.begin().await?;
        if !order_repo::save_totals(&mut *tx, &updated).await? {
            return Err(OrderError::Conflict { id: order.id });
        }
        discount_repo::insert(&mut *tx, &new_discount).await?;
        payment::update_amount(&mut *tx, order.id, totals.total, now).await?;
        tx.commit().await?;

        tracing::info!(
            order_id = order.id,
            source = ?new_discount.source,
            amount = new_discount.amount,
            total = totals.total,
            "Discount applied"
        );
        self.publish(
            &order,
            OrderEventKind::DiscountApplied {
                discount_amount: totals.discount,
                total_amount: totals.total,
            },
        );
        self.get_order(ctx, order.id).await
    }

    /// Advance the delivery sub-status (forward only)
    pub async fn update_delivery_status(
        &self,
        ctx: &RequestContext,
        order_id: i64,
        request: DeliveryStatusRequest,
    ) -> OrderResult<OrderView> {
        let order = self.load_order(ctx, order_id).await?;
        if order.order_type != OrderType::Delivery {
            return Err(OrderError::Validation(
                "Delivery status only applies to delivery orders".into(),
            ));
        }
        if order.status == OrderStatus::Cancelled {
            return Err(OrderError::Validation(
                "Cancelled orders cannot be delivered".into(),
            ));
        }
        if let Some(current) = order.delivery_status
            && request.status <= current
        {
            return Err(OrderError::Validation(format!(
                "Delivery status cannot move from {current:?} to {:?}",
                request.status
            )));
        }

        let now = now_millis();
        let delivered_at = (request.status == DeliveryStatus::Delivered).then_some(now);
        if !order_repo::update_delivery_status(
            &self.pool,
            order.id,
            order.delivery_status,
            request.status,
            delivered_at,
            now,
        )
        .await?
        {
            return Err(OrderError::Conflict { id: order.id });
        }

        tracing::info!(order_id = order.id, status = ?request.status, "Delivery status updated");
        self.publish(
            &order,
            OrderEventKind::DeliveryUpdated {
                status: request.status,
            },
        );
        self.get_order(ctx, order.id).await
    }
}
