//! Promotion Repository

use super::RepoResult;
use shared::models::Promotion;
use sqlx::SqliteExecutor;

/// Lowest active promotional price for an item at `at` (Unix millis)
pub async fn find_active_price(
    db: impl SqliteExecutor<'_>,
    merchant_id: i64,
    menu_item_id: i64,
    at: i64,
) -> RepoResult<Option<f64>> {
    let price = sqlx::query_scalar::<_, Option<f64>>(
        "SELECT MIN(promo_price) FROM promotions \
         WHERE merchant_id = ? AND menu_item_id = ? AND is_active = 1 \
           AND starts_at <= ? AND ends_at >= ?",
    )
    .bind(merchant_id)
    .bind(menu_item_id)
    .bind(at)
    .bind(at)
    .fetch_one(db)
    .await?;
    Ok(price)
}

pub async fn create(db: impl SqliteExecutor<'_>, promo: &Promotion) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO promotions (id, merchant_id, menu_item_id, promo_price, starts_at, ends_at, is_active) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(promo.id)
    .bind(promo.merchant_id)
    .bind(promo.menu_item_id)
    .bind(promo.promo_price)
    .bind(promo.starts_at)
    .bind(promo.ends_at)
    .bind(promo.is_active)
    .execute(db)
    .await?;
    Ok(())
}
