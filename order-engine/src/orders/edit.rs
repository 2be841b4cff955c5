//! Order Edit Diff Engine
//!
//! An edit fully replaces the item set of an open order. Stock follows the
//! difference between the stored and the new quantities per counter, never
//! the absolute amounts, so an unchanged line costs nothing.
//!
//! Scheduled orders that have not been accepted yet hold no stock; editing
//! them only changes what acceptance will later deduct.

use shared::models::{MerchantSettings, Order, OrderStatus, OrderType, Payment};
use shared::order::{EditOrderRequest, OrderEventKind, OrderView};
use shared::util::now_millis;

use super::composer::Composer;
use super::discount::{self, DiscountContext};
use super::error::{OrderError, OrderResult};
use super::inventory::{self, StockDelta, StockUsage};
use super::money::compute_totals;
use super::service::{OrderService, RequestContext};
use crate::db::repository::{discount as discount_repo, order as order_repo, payment};
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_TABLE_NUMBER_LEN, normalize_optional, validate_optional_text,
    validate_required_text,
};

/// Nonzero `new - old` per counter, in key order
pub fn compute_deltas(old: &StockUsage, new: &StockUsage) -> Vec<StockDelta> {
    let mut keys: Vec<_> = old.keys().chain(new.keys()).copied().collect();
    keys.sort_unstable();
    keys.dedup();
    keys.into_iter()
        .filter_map(|key| {
            let delta = new.get(&key) - old.get(&key);
            (delta != 0).then_some(StockDelta { key, delta })
        })
        .collect()
}

/// Gate checked before any diffing
pub fn ensure_editable(
    order: &Order,
    payment: Option<&Payment>,
    requested_type: OrderType,
    settings: &MerchantSettings,
) -> OrderResult<()> {
    if !settings.order_edit_enabled {
        return Err(OrderError::EditDisabled);
    }
    if !matches!(order.status, OrderStatus::Pending | OrderStatus::Accepted) {
        return Err(OrderError::NotEditable(format!(
            "{} orders cannot be edited",
            order.status
        )));
    }
    if order.order_type == OrderType::Delivery {
        return Err(OrderError::NotEditable(
            "Delivery orders cannot be edited".into(),
        ));
    }
    if payment.is_some_and(Payment::is_completed) {
        return Err(OrderError::PaymentAlreadyCompleted(order.id));
    }
    if requested_type != order.order_type {
        return Err(OrderError::OrderTypeMismatch {
            from: order.order_type,
            to: requested_type,
        });
    }
    Ok(())
}

impl OrderService {
    /// Replace the items of an open dine-in or takeaway order
    pub async fn edit_order(
        &self,
        ctx: &RequestContext,
        order_id: i64,
        request: EditOrderRequest,
    ) -> OrderResult<OrderView> {
        let requested_type: OrderType = request
            .order_type
            .parse()
            .map_err(|_| OrderError::InvalidOrderType(request.order_type.clone()))?;
        if request.items.is_empty() {
            return Err(OrderError::Empty);
        }
        validate_optional_text(&request.table_number, "table_number", MAX_TABLE_NUMBER_LEN)?;
        validate_optional_text(&request.notes, "notes", MAX_NOTE_LEN)?;

        let order = self.load_order(ctx, order_id).await?;
        let settings = self.load_settings(order.merchant_id).await?;
        let existing_payment = payment::find_by_order(&self.pool, order.id).await?;
        ensure_editable(&order, existing_payment.as_ref(), requested_type, &settings)?;

        let table_number = match normalize_optional(request.table_number.clone()) {
            Some(table) => Some(table),
            None => order.table_number.clone(),
        };
        if order.order_type == OrderType::DineIn {
            validate_required_text(
                table_number.as_deref().unwrap_or_default(),
                "table_number",
                MAX_TABLE_NUMBER_LEN,
            )?;
        }

        let now = now_millis();
        let composed = Composer::new(&self.pool, order.merchant_id, &settings, now)
            .with_stock_check(false)
            .compose(order.id, &request.items)
            .await?;
        let (items, addons) = composed.rows();

        let old_items = order_repo::find_items(&self.pool, order.id).await?;
        let old_addons = order_repo::find_addons(&self.pool, order.id).await?;
        let deltas = compute_deltas(
            &StockUsage::from_rows(&old_items, &old_addons),
            &composed.stock_usage(),
        );
        inventory::ensure_available(&self.pool, &deltas).await?;

        let prior_discounts = discount_repo::find_by_order(&self.pool, order.id).await?;
        let dctx = DiscountContext {
            merchant_id: order.merchant_id,
            customer_id: order.customer_id,
            order_id: order.id,
            exclude_order_id: Some(order.id),
            subtotal: composed.subtotal,
            items: &items,
        };
        let recomputed = discount::recompute(self.vouchers.as_ref(), &prior_discounts, dctx).await?;
        let discount_amount = recomputed
            .as_ref()
            .map_or(order.discount_amount, |r| r.total);

        let totals = compute_totals(
            composed.subtotal,
            discount_amount,
            order.order_type,
            &settings,
            order.delivery_fee_amount,
        );
        let mut updated = Order {
            table_number,
            notes: normalize_optional(request.notes.clone()).or_else(|| order.notes.clone()),
            edited_at: Some(now),
            edited_by: ctx.user_id,
            updated_at: now,
            ..order.clone()
        };
        totals.apply_to(&mut updated);

        // The deltas were diffed against lines read at `order.version`; any
        // write since then (another edit, a status change) fails the check.
        let mut tx = self.pool.begin().await?;
        if !order_repo::save_edit(&mut *tx, &updated).await? {
            tracing::warn!(order_id = order.id, version = order.version, "Concurrent edit lost");
            return Err(OrderError::Conflict { id: order.id });
        }
        if order.stock_deducted_at.is_some() {
            inventory::apply(&mut *tx, &deltas).await?;
        }
        order_repo::delete_lines(&mut *tx, order.id).await?;
        order_repo::insert_lines(&mut *tx, &items, &addons).await?;
        if let Some(r) = &recomputed {
            discount_repo::replace_all(&mut *tx, order.id, &r.discounts).await?;
        }
        payment::update_amount(&mut *tx, order.id, totals.total, now).await?;
        tx.commit().await?;

        tracing::info!(
            order_id = order.id,
            merchant_id = order.merchant_id,
            lines = items.len(),
            stock_deltas = deltas.len(),
            stock_applied = order.stock_deducted_at.is_some(),
            total = totals.total,
            "Order edited"
        );
        self.publish(
            &updated,
            OrderEventKind::Edited {
                total_amount: totals.total,
            },
        );
        self.get_order(ctx, order.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::inventory::StockKey;
    use shared::models::{PaymentMethod, PaymentStatus};

    fn usage(entries: &[(StockKey, i64)]) -> StockUsage {
        let mut usage = StockUsage::default();
        for (key, qty) in entries {
            usage.add(*key, *qty);
        }
        usage
    }

    fn order(status: OrderStatus, order_type: OrderType) -> Order {
        Order {
            id: 7,
            merchant_id: 1,
            customer_id: None,
            customer_name: None,
            customer_phone: None,
            order_type,
            status,
            table_number: Some("4".into()),
            is_scheduled: false,
            scheduled_at: None,
            delivery_address: None,
            delivery_status: None,
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

    fn payment(status: PaymentStatus) -> Payment {
        Payment {
            id: 9,
            order_id: 7,
            amount: 10.0,
            method: PaymentMethod::Cash,
            status,
            paid_at: None,
            paid_by: None,
            created_at: 1,
            updated_at: 1,
        }
    }

    #[test]
    fn test_deltas_cover_both_sides() {
        let a = StockKey::menu_item(1);
        let b = StockKey::menu_item(2);
        let x = StockKey::addon(3);
        let old = usage(&[(a, 2), (b, 1), (x, 4)]);
        let new = usage(&[(a, 5), (x, 4), (StockKey::addon(8), 2)]);

        let deltas = compute_deltas(&old, &new);
        assert_eq!(
            deltas,
            vec![
                StockDelta { key: a, delta: 3 },
                StockDelta { key: b, delta: -1 },
                StockDelta {
                    key: StockKey::addon(8),
                    delta: 2
                },
            ]
        );
    }

    #[test]
    fn test_identical_usage_has_no_deltas() {
        let a = StockKey::menu_item(1);
        assert!(compute_deltas(&usage(&[(a, 2)]), &usage(&[(a, 2)])).is_empty());
        assert!(compute_deltas(&StockUsage::default(), &StockUsage::default()).is_empty());
    }

    #[test]
    fn test_editable_open_dine_in() {
        let settings = MerchantSettings::default();
        let o = order(OrderStatus::Accepted, OrderType::DineIn);
        let p = payment(PaymentStatus::Pending);
        assert!(ensure_editable(&o, Some(&p), OrderType::DineIn, &settings).is_ok());
        assert!(ensure_editable(&o, None, OrderType::DineIn, &settings).is_ok());
    }

    #[test]
    fn test_edit_rejections() {
        let settings = MerchantSettings::default();

        let o = order(OrderStatus::InProgress, OrderType::DineIn);
        assert!(matches!(
            ensure_editable(&o, None, OrderType::DineIn, &settings),
            Err(OrderError::NotEditable(_))
        ));

        let o = order(OrderStatus::Pending, OrderType::Delivery);
        assert!(matches!(
            ensure_editable(&o, None, OrderType::Delivery, &settings),
            Err(OrderError::NotEditable(_))
        ));

        let o = order(OrderStatus::Pending, OrderType::Takeaway);
        let paid = payment(PaymentStatus::Completed);
        assert!(matches!(
            ensure_editable(&o, Some(&paid), OrderType::Takeaway, &settings),
            Err(OrderError::PaymentAlreadyCompleted(7))
        ));

        assert!(matches!(
            ensure_editable(&o, None, OrderType::DineIn, &settings),
            Err(OrderError::OrderTypeMismatch { .. })
        ));

        let disabled = MerchantSettings {
            order_edit_enabled: false,
            ..MerchantSettings::default()
        };
        assert!(matches!(
            ensure_editable(&o, None, OrderType::Takeaway, &disabled),
            Err(OrderError::EditDisabled)
        ));
    }
}
