//! Discount Recomputation
//!
//! Re-derives every recorded discount against a new subtotal/item set with
//! the rule that produced it: manual percentages are re-applied, manual
//! fixed amounts are kept verbatim, and vouchers are re-quoted by the
//! voucher service (with any staff override re-applied on top).

use rust_decimal::Decimal;
use shared::models::{DiscountSource, DiscountType, OrderDiscount, OrderItem};
use shared::util::{now_millis, snowflake_id};

use super::error::{OrderError, OrderResult};
use super::money::{percent_of, require_finite, round2, to_decimal, to_f64};
use super::oracles::{VoucherKey, VoucherLine, VoucherOracle, VoucherQuote, VoucherRequest};

/// What the voucher service needs to know about the order
#[derive(Debug, Clone, Copy)]
pub struct DiscountContext<'a> {
    pub merchant_id: i64,
    pub customer_id: Option<i64>,
    pub order_id: i64,
    /// Set once the order exists, so its own usage is not counted
    pub exclude_order_id: Option<i64>,
    pub subtotal: f64,
    pub items: &'a [OrderItem],
}

/// Refreshed discount set
#[derive(Debug, Clone, PartialEq)]
pub struct Recomputed {
    pub discounts: Vec<OrderDiscount>,
    pub total: f64,
}

pub fn voucher_lines(items: &[OrderItem]) -> Vec<VoucherLine> {
    items
        .iter()
        .map(|item| VoucherLine {
            menu_item_id: item.menu_item_id,
            name: item.name.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
            subtotal: item.subtotal,
        })
        .collect()
}

/// Amount of a manual discount against `subtotal`
pub fn manual_amount(discount_type: DiscountType, value: f64, subtotal: f64) -> f64 {
    match discount_type {
        DiscountType::Percentage => to_f64(percent_of(to_decimal(subtotal), to_decimal(value))),
        DiscountType::FixedAmount => to_f64(to_decimal(value)),
    }
}

/// Re-apply a staff override to a voucher quote. Returns `(value, amount)`.
///
/// Percentages are clamped to 0..=100, applied to the eligible subtotal and
/// capped by the voucher's maximum discount; fixed amounts are capped at
/// the eligible subtotal.
pub fn apply_override(quote: &VoucherQuote, override_value: f64) -> (f64, f64) {
    let eligible = to_decimal(quote.eligible_subtotal).max(Decimal::ZERO);
    match quote.discount_type {
        DiscountType::Percentage => {
            let pct = to_decimal(override_value).clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
            let mut amount = percent_of(eligible, pct);
            if let Some(max) = quote.max_discount {
                amount = amount.min(round2(to_decimal(max)));
            }
            (to_f64(pct), to_f64(amount))
        }
        DiscountType::FixedAmount => {
            let value = to_decimal(override_value).max(Decimal::ZERO);
            (to_f64(value), to_f64(value.min(eligible)))
        }
    }
}

fn validate_manual(discount_type: DiscountType, value: f64) -> OrderResult<()> {
    require_finite(value, "discount value")?;
    if value < 0.0 {
        return Err(OrderError::InvalidDiscount(format!(
            "Discount value must not be negative, got {value}"
        )));
    }
    if discount_type == DiscountType::Percentage && value > 100.0 {
        return Err(OrderError::InvalidDiscount(format!(
            "Percentage discount must be between 0 and 100, got {value}"
        )));
    }
    Ok(())
}

/// Build a new `MANUAL` discount row
pub fn manual_discount(
    order_id: i64,
    label: Option<String>,
    discount_type: DiscountType,
    value: f64,
    subtotal: f64,
) -> OrderResult<OrderDiscount> {
    validate_manual(discount_type, value)?;
    Ok(OrderDiscount {
        id: snowflake_id(),
        order_id,
        source: DiscountSource::Manual,
        label: label.unwrap_or_else(|| "Manual discount".to_string()),
        discount_type,
        discount_value: to_f64(to_decimal(value)),
        amount: manual_amount(discount_type, value, subtotal),
        voucher_template_id: None,
        voucher_code: None,
        override_value: None,
        created_at: now_millis(),
    })
}

/// Quote a voucher and build its discount row
pub async fn voucher_discount(
    oracle: &dyn VoucherOracle,
    ctx: DiscountContext<'_>,
    source: DiscountSource,
    key: VoucherKey,
    override_value: Option<f64>,
) -> OrderResult<OrderDiscount> {
    if key.is_empty() {
        return Err(OrderError::InvalidDiscount(
            "A voucher template id or code is required".into(),
        ));
    }
    if let Some(v) = override_value {
        require_finite(v, "override value")?;
    }

    let request = VoucherRequest {
        merchant_id: ctx.merchant_id,
        customer_id: ctx.customer_id,
        key: key.clone(),
        subtotal: ctx.subtotal,
        items: voucher_lines(ctx.items),
        exclude_order_id: ctx.exclude_order_id,
    };
    let quote = oracle.quote(request).await.map_err(|rejection| {
        tracing::info!(
            order_id = ctx.order_id,
            voucher = %rejection.name,
            reason = %rejection.reason,
            "Voucher rejected"
        );
        OrderError::VoucherRejected {
            name: rejection.name,
            reason: rejection.reason,
        }
    })?;

    let (value, amount) = match override_value {
        Some(v) => apply_override(&quote, v),
        None => (quote.discount_value, to_f64(to_decimal(quote.amount))),
    };

    Ok(OrderDiscount {
        id: snowflake_id(),
        order_id: ctx.order_id,
        source,
        label: quote.label,
        discount_type: quote.discount_type,
        discount_value: value,
        amount,
        voucher_template_id: key.template_id,
        voucher_code: key.code,
        override_value,
        created_at: now_millis(),
    })
}

/// Sum of discount amounts, rounded
pub fn total_of(discounts: &[OrderDiscount]) -> f64 {
    to_f64(
        discounts
            .iter()
            .fold(Decimal::ZERO, |acc, d| round2(acc + to_decimal(d.amount))),
    )
}

/// Recompute `prior` against the new subtotal/items.
///
/// Returns `None` when the order had no discounts recorded: the caller
/// keeps the stored flat discount amount untouched.
pub async fn recompute(
    oracle: &dyn VoucherOracle,
    prior: &[OrderDiscount],
    ctx: DiscountContext<'_>,
) -> OrderResult<Option<Recomputed>> {
    if prior.is_empty() {
        return Ok(None);
    }

    let mut discounts = Vec::with_capacity(prior.len());
    for old in prior {
        let refreshed = match old.source {
            DiscountSource::Manual => OrderDiscount {
                amount: manual_amount(old.discount_type, old.discount_value, ctx.subtotal),
                ..old.clone()
            },
            DiscountSource::PosVoucher | DiscountSource::CustomerVoucher => {
                let key = VoucherKey {
                    template_id: old.voucher_template_id,
                    code: old.voucher_code.clone(),
                };
                let fresh =
                    voucher_discount(oracle, ctx, old.source, key, old.override_value).await?;
                OrderDiscount {
                    id: old.id,
                    created_at: old.created_at,
                    ..fresh
                }
            }
        };
        tracing::debug!(
            order_id = ctx.order_id,
            source = ?refreshed.source,
            old_amount = old.amount,
            new_amount = refreshed.amount,
            "Discount recomputed"
        );
        discounts.push(refreshed);
    }

    let total = total_of(&discounts);
    Ok(Some(Recomputed { discounts, total }))
}
