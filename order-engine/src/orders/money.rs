//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally and rounded to two
//! decimal places after every step, then converted to `f64` for storage.

use rust_decimal::prelude::*;
use shared::models::{MerchantSettings, Order, OrderType};

use super::error::{OrderError, OrderResult};

/// Rounding strategy for monetary values (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per item
pub const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line
pub const MAX_QUANTITY: i64 = 9999;

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
pub fn require_finite(value: f64, field_name: &str) -> OrderResult<()> {
    if !value.is_finite() {
        return Err(OrderError::Validation(format!(
            "{field_name} must be a finite number, got {value}"
        )));
    }
    Ok(())
}

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Round to 2 decimal places, midpoint away from zero
#[inline]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round2(value).to_f64().unwrap_or_default()
}

/// `round2(base × pct / 100)`
pub fn percent_of(base: Decimal, pct: Decimal) -> Decimal {
    round2(base * pct / Decimal::ONE_HUNDRED)
}

/// `round2(unit_price × quantity)`
pub fn line_amount(unit_price: f64, quantity: i64) -> Decimal {
    round2(to_decimal(unit_price) * Decimal::from(quantity))
}

/// Monetary breakdown of an order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub service_charge: f64,
    pub packaging_fee: f64,
    pub delivery_fee: f64,
    pub discount: f64,
    pub total: f64,
}

impl OrderTotals {
    /// Copy the breakdown onto an order row
    pub fn apply_to(&self, order: &mut Order) {
        order.subtotal = self.subtotal;
        order.tax_amount = self.tax;
        order.service_charge_amount = self.service_charge;
        order.packaging_fee_amount = self.packaging_fee;
        order.delivery_fee_amount = self.delivery_fee;
        order.discount_amount = self.discount;
        order.total_amount = self.total;
    }
}

/// Compute order totals from a subtotal and discount.
///
/// `delivery_fee` only applies to delivery orders; the total never goes
/// below zero.
pub fn compute_totals(
    subtotal: f64,
    discount: f64,
    order_type: OrderType,
    settings: &MerchantSettings,
    delivery_fee: f64,
) -> OrderTotals {
    let subtotal = round2(to_decimal(subtotal));
    let discount = round2(to_decimal(discount));

    let tax = if settings.tax_enabled {
        percent_of(subtotal, to_decimal(settings.tax_percent))
    } else {
        Decimal::ZERO
    };

    let service_charge = if settings.service_charge_enabled && order_type == OrderType::DineIn {
        percent_of(subtotal, to_decimal(settings.service_charge_percent))
    } else {
        Decimal::ZERO
    };

    let packaging_fee = if settings.packaging_fee_enabled && order_type != OrderType::DineIn {
        round2(to_decimal(settings.packaging_fee))
    } else {
        Decimal::ZERO
    };

    let delivery_fee = if order_type == OrderType::Delivery {
        round2(to_decimal(delivery_fee))
    } else {
        Decimal::ZERO
    };

    let gross = round2(subtotal + tax + service_charge + packaging_fee + delivery_fee);
    let total = round2(gross - discount).max(Decimal::ZERO);

    OrderTotals {
        subtotal: to_f64(subtotal),
        tax: to_f64(tax),
        service_charge: to_f64(service_charge),
        packaging_fee: to_f64(packaging_fee),
        delivery_fee: to_f64(delivery_fee),
        discount: to_f64(discount),
        total: to_f64(total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> MerchantSettings {
        MerchantSettings {
            tax_enabled: true,
            tax_percent: 11.0,
            service_charge_enabled: true,
            service_charge_percent: 5.0,
            packaging_fee_enabled: true,
            packaging_fee: 1.5,
            ..MerchantSettings::default()
        }
    }

    #[test]
    fn test_round2_midpoint_away_from_zero() {
        assert_eq!(round2(Decimal::new(1005, 3)), Decimal::new(101, 2));
        assert_eq!(round2(Decimal::new(-1005, 3)), Decimal::new(-101, 2));
        assert_eq!(to_f64(Decimal::new(12345, 3)), 12.35);
    }

    #[test]
    fn test_float_noise_is_absorbed() {
        // 0.1 + 0.2 in f64 is 0.30000000000000004
        let sum = round2(to_decimal(0.1) + to_decimal(0.2));
        assert_eq!(to_f64(sum), 0.3);
        assert_eq!(to_f64(line_amount(0.1, 3)), 0.3);
    }

    #[test]
    fn test_dine_in_totals() {
        let totals = compute_totals(100.0, 10.0, OrderType::DineIn, &settings(), 0.0);
        assert_eq!(totals.tax, 11.0);
        assert_eq!(totals.service_charge, 5.0);
        assert_eq!(totals.packaging_fee, 0.0);
        assert_eq!(totals.total, 106.0);
    }

    #[test]
    fn test_takeaway_gets_packaging_not_service_charge() {
        let totals = compute_totals(20.0, 0.0, OrderType::Takeaway, &settings(), 4.0);
        assert_eq!(totals.service_charge, 0.0);
        assert_eq!(totals.packaging_fee, 1.5);
        assert_eq!(totals.delivery_fee, 0.0);
        assert_eq!(totals.total, 23.7);
    }

    #[test]
    fn test_delivery_fee_only_on_delivery() {
        let totals = compute_totals(20.0, 0.0, OrderType::Delivery, &settings(), 4.0);
        assert_eq!(totals.delivery_fee, 4.0);
        assert_eq!(totals.total, 27.7);
    }

    #[test]
    fn test_total_floors_at_zero() {
        let totals = compute_totals(
            5.0,
            50.0,
            OrderType::Takeaway,
            &MerchantSettings::default(),
            0.0,
        );
        assert_eq!(totals.total, 0.0);
        assert_eq!(totals.discount, 50.0);
    }

    #[test]
    fn test_percent_rounds_each_step() {
        assert_eq!(to_f64(percent_of(to_decimal(33.33), to_decimal(15.0))), 5.0);
        assert_eq!(to_f64(percent_of(to_decimal(10.05), to_decimal(50.0))), 5.03);
    }

    #[test]
    fn test_require_finite() {
        assert!(require_finite(1.0, "price").is_ok());
        assert!(require_finite(f64::NAN, "price").is_err());
        assert!(require_finite(f64::INFINITY, "price").is_err());
    }
}
