//! Merchant row and settings blob

use serde::{Deserialize, Serialize};

/// Merchant (tenant) row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Merchant {
    #[serde(with = "crate::util::id_string")]
    pub id: i64,
    pub name: String,
    /// JSON-encoded [`MerchantSettings`]
    pub settings: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Per-merchant business settings, stored as JSON on the merchant row.
///
/// Every field has a default so that partially filled blobs still parse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MerchantSettings {
    pub tax_enabled: bool,
    /// Percent of subtotal (11 = 11%)
    pub tax_percent: f64,
    pub service_charge_enabled: bool,
    /// Percent of subtotal, dine-in only
    pub service_charge_percent: f64,
    pub packaging_fee_enabled: bool,
    /// Flat fee for takeaway and delivery orders
    pub packaging_fee: f64,
    /// Flat fee for delivery orders
    pub delivery_fee: f64,
    pub custom_item_max_name_length: usize,
    pub custom_item_max_price: f64,
    pub order_edit_enabled: bool,
}

impl Default for MerchantSettings {
    fn default() -> Self {
        Self {
            tax_enabled: false,
            tax_percent: 0.0,
            service_charge_enabled: false,
            service_charge_percent: 0.0,
            packaging_fee_enabled: false,
            packaging_fee: 0.0,
            delivery_fee: 0.0,
            custom_item_max_name_length: 100,
            custom_item_max_price: 10_000.0,
            order_edit_enabled: true,
        }
    }
}

impl MerchantSettings {
    /// Parse a stored blob; `None` or an empty string yields defaults
    pub fn from_json(raw: Option<&str>) -> Result<Self, serde_json::Error> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(json) => serde_json::from_str(json),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_blob_uses_defaults() {
        let settings =
            MerchantSettings::from_json(Some(r#"{"tax_enabled":true,"tax_percent":11}"#)).unwrap();
        assert!(settings.tax_enabled);
        assert_eq!(settings.tax_percent, 11.0);
        assert!(settings.order_edit_enabled);
        assert_eq!(settings.custom_item_max_name_length, 100);
    }

    #[test]
    fn test_missing_blob_is_default() {
        assert_eq!(MerchantSettings::from_json(None).unwrap(), MerchantSettings::default());
        assert_eq!(
            MerchantSettings::from_json(Some("  ")).unwrap(),
            MerchantSettings::default()
        );
    }

    #[test]
    fn test_malformed_blob_errors() {
        assert!(MerchantSettings::from_json(Some("{not json")).is_err());
    }
}
