//! Catalog Models (menu items, add-on items, promotions)

use serde::{Deserialize, Serialize};

/// Menu item row
///
/// `stock_qty` is only meaningful when `track_stock` is set; untracked items
/// carry no counter at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    #[serde(with = "crate::util::id_string")]
    pub id: i64,
    #[serde(with = "crate::util::id_string")]
    pub merchant_id: i64,
    pub name: String,
    pub price: f64,
    pub is_active: bool,
    /// Soft-delete marker (Unix millis)
    pub deleted_at: Option<i64>,
    pub track_stock: bool,
    pub stock_qty: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Add-on item row (same stock semantics as [`MenuItem`])
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AddonItem {
    #[serde(with = "crate::util::id_string")]
    pub id: i64,
    #[serde(with = "crate::util::id_string")]
    pub merchant_id: i64,
    pub name: String,
    pub price: f64,
    pub is_active: bool,
    pub deleted_at: Option<i64>,
    pub track_stock: bool,
    pub stock_qty: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Shared view over catalog rows
pub trait CatalogEntry {
    fn id(&self) -> i64;
    fn name(&self) -> &str;
    fn price(&self) -> f64;
    fn is_active(&self) -> bool;
    fn is_deleted(&self) -> bool;
    fn track_stock(&self) -> bool;
    fn stock_qty(&self) -> Option<i64>;

    /// Active and not soft-deleted
    fn is_orderable(&self) -> bool {
        self.is_active() && !self.is_deleted()
    }

    /// Tracked item: `track_stock` set and a counter present
    fn tracked_stock(&self) -> Option<i64> {
        if self.track_stock() { self.stock_qty() } else { None }
    }
}

macro_rules! impl_catalog_entry {
    ($ty:ty) => {
        impl CatalogEntry for $ty {
            fn id(&self) -> i64 {
                self.id
            }
            fn name(&self) -> &str {
                &self.name
            }
            fn price(&self) -> f64 {
                self.price
            }
            fn is_active(&self) -> bool {
                self.is_active
            }
            fn is_deleted(&self) -> bool {
                self.deleted_at.is_some()
            }
            fn track_stock(&self) -> bool {
                self.track_stock
            }
            fn stock_qty(&self) -> Option<i64> {
                self.stock_qty
            }
        }
    };
}

impl_catalog_entry!(MenuItem);
impl_catalog_entry!(AddonItem);

/// Date-windowed promotional price for a menu item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Promotion {
    #[serde(with = "crate::util::id_string")]
    pub id: i64,
    #[serde(with = "crate::util::id_string")]
    pub merchant_id: i64,
    #[serde(with = "crate::util::id_string")]
    pub menu_item_id: i64,
    pub promo_price: f64,
    /// Window start (Unix millis, inclusive)
    pub starts_at: i64,
    /// Window end (Unix millis, inclusive)
    pub ends_at: i64,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu_item(track_stock: bool, stock_qty: Option<i64>) -> MenuItem {
        MenuItem {
            id: 1,
            merchant_id: 1,
            name: "Latte".into(),
            price: 3.5,
            is_active: true,
            deleted_at: None,
            track_stock,
            stock_qty,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_tracked_stock_requires_flag_and_counter() {
        assert_eq!(menu_item(true, Some(4)).tracked_stock(), Some(4));
        assert_eq!(menu_item(false, Some(4)).tracked_stock(), None);
        assert_eq!(menu_item(true, None).tracked_stock(), None);
    }

    #[test]
    fn test_soft_deleted_is_not_orderable() {
        let mut item = menu_item(false, None);
        assert!(item.is_orderable());
        item.deleted_at = Some(1);
        assert!(!item.is_orderable());
    }

    #[test]
    fn test_ids_serialize_as_strings() {
        let json = serde_json::to_value(menu_item(false, None)).unwrap();
        assert_eq!(json["id"], "1");
        assert_eq!(json["merchant_id"], "1");
    }
}
