//! Order creation

use shared::models::{
    DeliveryStatus, DiscountSource, Order, OrderStatus, OrderType, Payment, PaymentStatus,
};
use shared::order::{CreateOrderRequest, OrderEventKind, OrderView};
use shared::util::{now_millis, snowflake_id};

use super::composer::Composer;
use super::discount::{self, DiscountContext};
use super::error::{OrderError, OrderResult};
use super::inventory;
use super::money::compute_totals;
use super::oracles::VoucherKey;
use super::service::{OrderService, RequestContext};
use crate::db::repository::{discount as discount_repo, order as order_repo, payment};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, MAX_TABLE_NUMBER_LEN,
    normalize_optional, validate_optional_text, validate_required_text,
};

/// Request fields after validation and normalization
struct ValidatedCreate {
    order_type: OrderType,
    table_number: Option<String>,
    delivery_address: Option<String>,
    notes: Option<String>,
}

fn validate_create(request: &CreateOrderRequest, now: i64) -> OrderResult<ValidatedCreate> {
    let order_type: OrderType = request
        .order_type
        .parse()
        .map_err(|_| OrderError::InvalidOrderType(request.order_type.clone()))?;
    if request.items.is_empty() {
        return Err(OrderError::Empty);
    }

    let table_number = normalize_optional(request.table_number.clone());
    let delivery_address = normalize_optional(request.delivery_address.clone());
    match order_type {
        OrderType::DineIn => validate_required_text(
            table_number.as_deref().unwrap_or_default(),
            "table_number",
            MAX_TABLE_NUMBER_LEN,
        )?,
        OrderType::Delivery => validate_required_text(
            delivery_address.as_deref().unwrap_or_default(),
            "delivery_address",
            MAX_ADDRESS_LEN,
        )?,
        OrderType::Takeaway => {}
    }
    validate_optional_text(&table_number, "table_number", MAX_TABLE_NUMBER_LEN)?;
    validate_optional_text(&request.notes, "notes", MAX_NOTE_LEN)?;
    if let Some(customer) = &request.customer {
        validate_optional_text(&customer.name, "customer name", MAX_NAME_LEN)?;
        validate_optional_text(&customer.phone, "customer phone", MAX_SHORT_TEXT_LEN)?;
    }
    if let Some(voucher) = &request.voucher {
        validate_optional_text(&voucher.code, "voucher code", MAX_SHORT_TEXT_LEN)?;
    }
    if let Some(at) = request.scheduled_at
        && at <= now
    {
        return Err(OrderError::Validation(
            "Scheduled time must be in the future".into(),
        ));
    }

    Ok(ValidatedCreate {
        order_type,
        table_number,
        delivery_address: if order_type == OrderType::Delivery {
            delivery_address
        } else {
            None
        },
        notes: normalize_optional(request.notes.clone()),
    })
}

impl OrderService {
    /// Place a new order.
    ///
    /// Immediate orders take their stock out in the same transaction that
    /// inserts them; scheduled orders defer it until they are accepted.
    pub async fn create_order(
        &self,
        ctx: &RequestContext,
        request: CreateOrderRequest,
    ) -> OrderResult<OrderView> {
        let now = now_millis();
        let valid = validate_create(&request, now)?;
        let settings = self.load_settings(ctx.merchant_id).await?;

        let available_at = request.scheduled_at.unwrap_or(now);
        if !self
            .availability
            .is_mode_available(ctx.merchant_id, valid.order_type, available_at)
            .await
        {
            return Err(OrderError::OrderTypeUnavailable(valid.order_type));
        }

        let order_id = snowflake_id();
        let composed = Composer::new(&self.pool, ctx.merchant_id, &settings, now)
            .compose(order_id, &request.items)
            .await?;
        let (items, addons) = composed.rows();
        let customer = request.customer.clone().unwrap_or_default();

        let mut discounts = Vec::new();
        if let Some(voucher) = request.voucher.clone() {
            let dctx = DiscountContext {
                merchant_id: ctx.merchant_id,
                customer_id: customer.id,
                order_id,
                exclude_order_id: None,
                subtotal: composed.subtotal,
                items: &items,
            };
            let key = VoucherKey {
                template_id: voucher.template_id,
                code: voucher.code,
            };
            discounts.push(
                discount::voucher_discount(
                    self.vouchers.as_ref(),
                    dctx,
                    DiscountSource::CustomerVoucher,
                    key,
                    None,
                )
                .await?,
            );
        }

        let totals = compute_totals(
            composed.subtotal,
            discount::total_of(&discounts),
            valid.order_type,
            &settings,
            settings.delivery_fee,
        );

        let is_scheduled = request.scheduled_at.is_some();
        let mut order = Order {
            id: order_id,
            merchant_id: ctx.merchant_id,
            customer_id: customer.id,
            customer_name: normalize_optional(customer.name),
            customer_phone: normalize_optional(customer.phone),
            order_type: valid.order_type,
            status: OrderStatus::Pending,
            table_number: valid.table_number,
            is_scheduled,
            scheduled_at: request.scheduled_at,
            delivery_address: valid.delivery_address,
            delivery_status: (valid.order_type == OrderType::Delivery)
                .then_some(DeliveryStatus::Pending),
            delivered_at: None,
            subtotal: 0.0,
            tax_amount: 0.0,
            service_charge_amount: 0.0,
            packaging_fee_amount: 0.0,
            delivery_fee_amount: 0.0,
            discount_amount: 0.0,
            total_amount: 0.0,
            payment_method_hint: request.payment_method,
            notes: valid.notes,
            stock_deducted_at: (!is_scheduled).then_some(now),
            edited_at: None,
            edited_by: None,
            created_at: now,
            updated_at: now,
            version: 0,
        };
        totals.apply_to(&mut order);

        let mut tx = self.pool.begin().await?;
        order_repo::insert(&mut *tx, &order).await?;
        order_repo::insert_lines(&mut *tx, &items, &addons).await?;
        for d in &discounts {
            discount_repo::insert(&mut *tx, d).await?;
        }
        if let Some(method) = request.payment_method {
            let pending = Payment {
                id: snowflake_id(),
                order_id,
                amount: totals.total,
                method,
                status: PaymentStatus::Pending,
                paid_at: None,
                paid_by: None,
                created_at: now,
                updated_at: now,
            };
            payment::insert(&mut *tx, &pending).await?;
        }
        if !is_scheduled {
            inventory::apply(&mut *tx, &composed.stock_usage().as_deductions()).await?;
        }
        tx.commit().await?;

        tracing::info!(
            order_id,
            merchant_id = ctx.merchant_id,
            order_type = %order.order_type,
            scheduled = is_scheduled,
            total = order.total_amount,
            "Order created"
        );
        self.publish(
            &order,
            OrderEventKind::Created {
                order_type: order.order_type,
                total_amount: order.total_amount,
            },
        );
        self.get_order(ctx, order_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{CustomerInput, OrderItemInput};

    fn request(order_type: &str) -> CreateOrderRequest {
        CreateOrderRequest {
            order_type: order_type.into(),
            table_number: Some("A1".into()),
            items: vec![OrderItemInput::custom("Soup", 4.0, 1)],
            customer: None,
            payment_method: None,
            scheduled_at: None,
            delivery_address: None,
            voucher: None,
            notes: None,
        }
    }

    #[test]
    fn test_unknown_order_type() {
        let err = validate_create(&request("DRIVE_THRU"), 0).err().unwrap();
        assert!(matches!(err, OrderError::InvalidOrderType(ref t) if t == "DRIVE_THRU"));
    }

    #[test]
    fn test_dine_in_needs_table_and_delivery_needs_address() {
        let mut req = request("DINE_IN");
        req.table_number = Some("  ".into());
        assert!(matches!(validate_create(&req, 0), Err(OrderError::Validation(_))));

        let req = request("DELIVERY");
        assert!(matches!(validate_create(&req, 0), Err(OrderError::Validation(_))));

        let mut req = request("DELIVERY");
        req.delivery_address = Some("12 Harbour Rd".into());
        let valid = validate_create(&req, 0).ok().unwrap();
        assert_eq!(valid.delivery_address.as_deref(), Some("12 Harbour Rd"));
    }

    #[test]
    fn test_schedule_must_be_in_future() {
        let mut req = request("TAKEAWAY");
        req.scheduled_at = Some(1_000);
        assert!(validate_create(&req, 2_000).is_err());
        assert!(validate_create(&req, 500).is_ok());
    }

    #[test]
    fn test_customer_fields_are_length_checked() {
        let mut req = request("TAKEAWAY");
        req.customer = Some(CustomerInput {
            id: None,
            name: Some("n".repeat(201)),
            phone: None,
        });
        assert!(validate_create(&req, 0).is_err());
    }
}
