//! Order Discount Repository

use super::RepoResult;
use shared::models::OrderDiscount;
use sqlx::{SqliteConnection, SqliteExecutor};

pub async fn find_by_order(
    db: impl SqliteExecutor<'_>,
    order_id: i64,
) -> RepoResult<Vec<OrderDiscount>> {
    let discounts = sqlx::query_as::<_, OrderDiscount>(
        "SELECT * FROM order_discounts WHERE order_id = ? ORDER BY created_at, rowid",
    )
    .bind(order_id)
    .fetch_all(db)
    .await?;
    Ok(discounts)
}

pub async fn insert(db: impl SqliteExecutor<'_>, discount: &OrderDiscount) -> RepoResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_discounts (
            id, order_id, source, label, discount_type, discount_value, amount,
            voucher_template_id, voucher_code, override_value, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(discount.id)
    .bind(discount.order_id)
    .bind(discount.source)
    .bind(&discount.label)
    .bind(discount.discount_type)
    .bind(discount.discount_value)
    .bind(discount.amount)
    .bind(discount.voucher_template_id)
    .bind(&discount.voucher_code)
    .bind(discount.override_value)
    .bind(discount.created_at)
    .execute(db)
    .await?;
    Ok(())
}

/// Delete-then-reinsert the discount set of an order
pub async fn replace_all(
    conn: &mut SqliteConnection,
    order_id: i64,
    discounts: &[OrderDiscount],
) -> RepoResult<()> {
    sqlx::query("DELETE FROM order_discounts WHERE order_id = ?")
        .bind(order_id)
        .execute(&mut *conn)
        .await?;
    for discount in discounts {
        insert(&mut *conn, discount).await?;
    }
    Ok(())
}
