//! Catalog Repository (menu items and add-ons)
//!
//! Stock counters live on the catalog rows. The decrement is a single
//! conditional `UPDATE ... RETURNING`; no row back means the guard failed.

use super::RepoResult;
use shared::models::{AddonItem, MenuItem};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqliteExecutor;

/// Which catalog table a stock counter lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CatalogKind {
    MenuItem,
    Addon,
}

impl CatalogKind {
    pub const fn table(&self) -> &'static str {
        match self {
            Self::MenuItem => "menu_items",
            Self::Addon => "addon_items",
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::MenuItem => "menu item",
            Self::Addon => "add-on",
        }
    }
}

/// Stock-related columns of a catalog row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StockRow {
    pub name: String,
    pub track_stock: bool,
    pub stock_qty: Option<i64>,
}

/// Create payload shared by both catalog tables
#[derive(Debug, Clone)]
pub struct NewCatalogItem {
    pub merchant_id: i64,
    pub name: String,
    pub price: f64,
    pub track_stock: bool,
    pub stock_qty: Option<i64>,
}

impl NewCatalogItem {
    pub fn untracked(merchant_id: i64, name: impl Into<String>, price: f64) -> Self {
        Self {
            merchant_id,
            name: name.into(),
            price,
            track_stock: false,
            stock_qty: None,
        }
    }

    pub fn tracked(merchant_id: i64, name: impl Into<String>, price: f64, stock: i64) -> Self {
        Self {
            merchant_id,
            name: name.into(),
            price,
            track_stock: true,
            stock_qty: Some(stock),
        }
    }
}

const INSERT_COLUMNS: &str = "(id, merchant_id, name, price, is_active, deleted_at, track_stock, stock_qty, created_at, updated_at) \
     VALUES (?, ?, ?, ?, ?, NULL, ?, ?, ?, ?) RETURNING *";

pub async fn create_menu_item(
    db: impl SqliteExecutor<'_>,
    data: &NewCatalogItem,
) -> RepoResult<MenuItem> {
    let now = now_millis();
    let item = sqlx::query_as::<_, MenuItem>(&format!("INSERT INTO menu_items {INSERT_COLUMNS}"))
        .bind(snowflake_id())
        .bind(data.merchant_id)
        .bind(&data.name)
        .bind(data.price)
        .bind(data.stock_qty.is_none_or(|q| q > 0))
        .bind(data.track_stock)
        .bind(data.stock_qty)
        .bind(now)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(item)
}

pub async fn create_addon_item(
    db: impl SqliteExecutor<'_>,
    data: &NewCatalogItem,
) -> RepoResult<AddonItem> {
    let now = now_millis();
    let item = sqlx::query_as::<_, AddonItem>(&format!("INSERT INTO addon_items {INSERT_COLUMNS}"))
        .bind(snowflake_id())
        .bind(data.merchant_id)
        .bind(&data.name)
        .bind(data.price)
        .bind(data.stock_qty.is_none_or(|q| q > 0))
        .bind(data.track_stock)
        .bind(data.stock_qty)
        .bind(now)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(item)
}

/// Find a menu item owned by the merchant (soft-deleted rows included)
pub async fn find_menu_item(
    db: impl SqliteExecutor<'_>,
    merchant_id: i64,
    id: i64,
) -> RepoResult<Option<MenuItem>> {
    let item = sqlx::query_as::<_, MenuItem>(
        "SELECT * FROM menu_items WHERE id = ? AND merchant_id = ?",
    )
    .bind(id)
    .bind(merchant_id)
    .fetch_optional(db)
    .await?;
    Ok(item)
}

/// Find an add-on owned by the merchant (soft-deleted rows included)
pub async fn find_addon_item(
    db: impl SqliteExecutor<'_>,
    merchant_id: i64,
    id: i64,
) -> RepoResult<Option<AddonItem>> {
    let item = sqlx::query_as::<_, AddonItem>(
        "SELECT * FROM addon_items WHERE id = ? AND merchant_id = ?",
    )
    .bind(id)
    .bind(merchant_id)
    .fetch_optional(db)
    .await?;
    Ok(item)
}

pub async fn find_stock(
    db: impl SqliteExecutor<'_>,
    kind: CatalogKind,
    id: i64,
) -> RepoResult<Option<StockRow>> {
    let row = sqlx::query_as::<_, StockRow>(&format!(
        "SELECT name, track_stock, stock_qty FROM {} WHERE id = ?",
        kind.table()
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Subtract `qty` only if the counter still covers it.
///
/// Returns the new counter, or `None` when no row matched (untracked,
/// missing, or not enough stock; the caller tells these apart).
pub async fn try_decrement_stock(
    db: impl SqliteExecutor<'_>,
    kind: CatalogKind,
    id: i64,
    qty: i64,
) -> RepoResult<Option<i64>> {
    let remaining = sqlx::query_scalar::<_, i64>(&format!(
        "UPDATE {} SET stock_qty = stock_qty - ?, updated_at = ? \
         WHERE id = ? AND track_stock = 1 AND stock_qty IS NOT NULL AND stock_qty >= ? \
         RETURNING stock_qty",
        kind.table()
    ))
    .bind(qty)
    .bind(now_millis())
    .bind(id)
    .bind(qty)
    .fetch_optional(db)
    .await?;
    Ok(remaining)
}

/// Add `qty` back to a tracked counter; `None` when the item is untracked
pub async fn increment_stock(
    db: impl SqliteExecutor<'_>,
    kind: CatalogKind,
    id: i64,
    qty: i64,
) -> RepoResult<Option<i64>> {
    let remaining = sqlx::query_scalar::<_, i64>(&format!(
        "UPDATE {} SET stock_qty = stock_qty + ?, updated_at = ? \
         WHERE id = ? AND track_stock = 1 AND stock_qty IS NOT NULL \
         RETURNING stock_qty",
        kind.table()
    ))
    .bind(qty)
    .bind(now_millis())
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(remaining)
}

pub async fn set_active(
    db: impl SqliteExecutor<'_>,
    kind: CatalogKind,
    id: i64,
    is_active: bool,
) -> RepoResult<()> {
    sqlx::query(&format!(
        "UPDATE {} SET is_active = ? WHERE id = ?",
        kind.table()
    ))
    .bind(is_active)
    .bind(id)
    .execute(db)
    .await?;
    Ok(())
}
