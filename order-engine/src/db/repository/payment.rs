//! Payment Repository

use super::RepoResult;
use shared::models::{Payment, PaymentStatus};
use sqlx::SqliteExecutor;

pub async fn find_by_order(
    db: impl SqliteExecutor<'_>,
    order_id: i64,
) -> RepoResult<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE order_id = ?")
        .bind(order_id)
        .fetch_optional(db)
        .await?;
    Ok(payment)
}

pub async fn insert(db: impl SqliteExecutor<'_>, payment: &Payment) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO payments (id, order_id, amount, method, status, paid_at, paid_by, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(payment.id)
    .bind(payment.order_id)
    .bind(payment.amount)
    .bind(payment.method)
    .bind(payment.status)
    .bind(payment.paid_at)
    .bind(payment.paid_by)
    .bind(payment.created_at)
    .bind(payment.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

/// Keep the pending payment in step with the order total
pub async fn update_amount(
    db: impl SqliteExecutor<'_>,
    order_id: i64,
    amount: f64,
    now: i64,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE payments SET amount = ?, updated_at = ? WHERE order_id = ? AND status = ?",
    )
    .bind(amount)
    .bind(now)
    .bind(order_id)
    .bind(PaymentStatus::Pending)
    .execute(db)
    .await?;
    Ok(())
}

/// Mark paid. An already recorded `paid_at` / `paid_by` is kept.
pub async fn mark_completed(
    db: impl SqliteExecutor<'_>,
    order_id: i64,
    paid_at: i64,
    paid_by: Option<i64>,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE payments SET status = ?, paid_at = COALESCE(paid_at, ?), \
         paid_by = COALESCE(paid_by, ?), updated_at = ? WHERE order_id = ?",
    )
    .bind(PaymentStatus::Completed)
    .bind(paid_at)
    .bind(paid_by)
    .bind(paid_at)
    .bind(order_id)
    .execute(db)
    .await?;
    Ok(())
}
