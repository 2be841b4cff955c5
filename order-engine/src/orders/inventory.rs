//! Inventory Ledger
//!
//! Race-safe stock counters. A decrement is one conditional write
//! (`stock_qty >= n`); when it matches nothing on a tracked item the caller's
//! transaction must abort with `INSUFFICIENT_STOCK`. After every successful
//! adjustment the item's active flag follows `stock_qty > 0`.
//!
//! Untracked items (and custom lines, which have no catalog row) are no-ops.

use std::collections::BTreeMap;

use shared::models::{OrderItem, OrderItemAddon};
use sqlx::{SqliteConnection, SqlitePool};

use super::error::{OrderError, OrderResult};
use crate::db::repository::catalog;

pub use crate::db::repository::catalog::CatalogKind;

/// A stock counter: catalog table + row id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StockKey {
    pub kind: CatalogKind,
    pub id: i64,
}

impl StockKey {
    pub const fn menu_item(id: i64) -> Self {
        Self {
            kind: CatalogKind::MenuItem,
            id,
        }
    }

    pub const fn addon(id: i64) -> Self {
        Self {
            kind: CatalogKind::Addon,
            id,
        }
    }
}

/// Signed change to a counter; positive takes stock out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDelta {
    pub key: StockKey,
    pub delta: i64,
}

/// Quantities an order consumes, per counter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockUsage(BTreeMap<StockKey, i64>);

impl StockUsage {
    pub fn add(&mut self, key: StockKey, qty: i64) {
        *self.0.entry(key).or_insert(0) += qty;
    }

    pub fn get(&self, key: &StockKey) -> i64 {
        self.0.get(key).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StockKey, &i64)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &StockKey> {
        self.0.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Usage of stored (or freshly composed) order lines. Custom lines are
    /// skipped; add-on usage is `addon qty × line qty`.
    pub fn from_rows(items: &[OrderItem], addons: &[OrderItemAddon]) -> Self {
        let mut usage = Self::default();
        let mut line_qty = BTreeMap::new();
        for item in items {
            line_qty.insert(item.id, item.quantity);
            if item.is_custom {
                continue;
            }
            if let Some(menu_item_id) = item.menu_item_id {
                usage.add(StockKey::menu_item(menu_item_id), item.quantity);
            }
        }
        for addon in addons {
            if let Some(qty) = line_qty.get(&addon.order_item_id) {
                usage.add(StockKey::addon(addon.addon_item_id), addon.quantity * qty);
            }
        }
        usage
    }

    /// Deltas that take the whole usage out of stock
    pub fn as_deductions(&self) -> Vec<StockDelta> {
        self.iter()
            .filter(|(_, qty)| **qty != 0)
            .map(|(key, qty)| StockDelta {
                key: *key,
                delta: *qty,
            })
            .collect()
    }

    /// Deltas that put the whole usage back
    pub fn as_returns(&self) -> Vec<StockDelta> {
        self.as_deductions()
            .into_iter()
            .map(|d| StockDelta {
                key: d.key,
                delta: -d.delta,
            })
            .collect()
    }
}

/// Adjust one counter by `delta` (positive decrements, negative increments).
///
/// Returns the new counter, or `None` when the item does not track stock.
pub async fn adjust(
    conn: &mut SqliteConnection,
    key: StockKey,
    delta: i64,
) -> OrderResult<Option<i64>> {
    if delta == 0 {
        return Ok(None);
    }

    let remaining = if delta > 0 {
        match catalog::try_decrement_stock(&mut *conn, key.kind, key.id, delta).await? {
            Some(left) => Some(left),
            None => match catalog::find_stock(&mut *conn, key.kind, key.id).await? {
                Some(row) if row.track_stock && row.stock_qty.is_some() => {
                    tracing::warn!(
                        kind = key.kind.label(),
                        item_id = key.id,
                        requested = delta,
                        available = row.stock_qty,
                        "Stock decrement rejected"
                    );
                    return Err(OrderError::insufficient_stock(row.name));
                }
                Some(_) => None,
                None => {
                    tracing::warn!(kind = key.kind.label(), item_id = key.id, "Stock item missing");
                    None
                }
            },
        }
    } else {
        catalog::increment_stock(&mut *conn, key.kind, key.id, -delta).await?
    };

    if let Some(left) = remaining {
        catalog::set_active(&mut *conn, key.kind, key.id, left > 0).await?;
        tracing::debug!(
            kind = key.kind.label(),
            item_id = key.id,
            delta,
            remaining = left,
            "Stock adjusted"
        );
    }
    Ok(remaining)
}

/// Apply every delta in key order; the first failure aborts
pub async fn apply(conn: &mut SqliteConnection, deltas: &[StockDelta]) -> OrderResult<()> {
    for d in deltas {
        adjust(&mut *conn, d.key, d.delta).await?;
    }
    Ok(())
}

/// Verify, outside any transaction, that each positive delta is covered
/// by the current counter. Only an early answer: the conditional write in
/// [`adjust`] remains the real guard.
pub async fn ensure_available(pool: &SqlitePool, deltas: &[StockDelta]) -> OrderResult<()> {
    for d in deltas.iter().filter(|d| d.delta > 0) {
        let Some(row) = catalog::find_stock(pool, d.key.kind, d.key.id).await? else {
            continue;
        };
        if !row.track_stock {
            continue;
        }
        if let Some(qty) = row.stock_qty
            && qty < d.delta
        {
            return Err(OrderError::insufficient_stock(row.name));
        }
    }
    Ok(())
}
