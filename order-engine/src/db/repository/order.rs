//! Order Repository
//!
//! Orders, their lines and line add-ons. Writes that must be atomic with
//! stock movements take a connection so they can run inside the caller's
//! transaction.

use super::RepoResult;
use shared::models::{DeliveryStatus, Order, OrderItem, OrderItemAddon, OrderStatus};
use sqlx::{SqliteConnection, SqliteExecutor};

/// Find an order owned by the merchant
pub async fn find_by_id(
    db: impl SqliteExecutor<'_>,
    merchant_id: i64,
    id: i64,
) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ? AND merchant_id = ?")
        .bind(id)
        .bind(merchant_id)
        .fetch_optional(db)
        .await?;
    Ok(order)
}

pub async fn find_items(db: impl SqliteExecutor<'_>, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT id, order_id, menu_item_id, is_custom, name, unit_price, quantity, subtotal, notes \
         FROM order_items WHERE order_id = ? ORDER BY line_no, id",
    )
    .bind(order_id)
    .fetch_all(db)
    .await?;
    Ok(items)
}

pub async fn find_addons(
    db: impl SqliteExecutor<'_>,
    order_id: i64,
) -> RepoResult<Vec<OrderItemAddon>> {
    let addons = sqlx::query_as::<_, OrderItemAddon>(
        "SELECT a.* FROM order_item_addons a \
         JOIN order_items i ON i.id = a.order_item_id \
         WHERE i.order_id = ? ORDER BY i.line_no, a.rowid",
    )
    .bind(order_id)
    .fetch_all(db)
    .await?;
    Ok(addons)
}

pub async fn insert(db: impl SqliteExecutor<'_>, order: &Order) -> RepoResult<()> {
    sqlx::query(
        r#"
        INSERT INTO orders (
            id, merchant_id, customer_id, customer_name, customer_phone,
            order_type, status, table_number, is_scheduled, scheduled_at,
            delivery_address, delivery_status, delivered_at,
            subtotal, tax_amount, service_charge_amount, packaging_fee_amount,
            delivery_fee_amount, discount_amount, total_amount,
            payment_method_hint, notes, stock_deducted_at, edited_at, edited_by,
            created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(order.id)
    .bind(order.merchant_id)
    .bind(order.customer_id)
    .bind(&order.customer_name)
    .bind(&order.customer_phone)
    .bind(order.order_type)
    .bind(order.status)
    .bind(&order.table_number)
    .bind(order.is_scheduled)
    .bind(order.scheduled_at)
    .bind(&order.delivery_address)
    .bind(order.delivery_status)
    .bind(order.delivered_at)
    .bind(order.subtotal)
    .bind(order.tax_amount)
    .bind(order.service_charge_amount)
    .bind(order.packaging_fee_amount)
    .bind(order.delivery_fee_amount)
    .bind(order.discount_amount)
    .bind(order.total_amount)
    .bind(order.payment_method_hint)
    .bind(&order.notes)
    .bind(order.stock_deducted_at)
    .bind(order.edited_at)
    .bind(order.edited_by)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

/// Insert lines (in list order) and their add-ons
pub async fn insert_lines(
    conn: &mut SqliteConnection,
    items: &[OrderItem],
    addons: &[OrderItemAddon],
) -> RepoResult<()> {
    for (line_no, item) in items.iter().enumerate() {
        sqlx::query(
            "INSERT INTO order_items \
             (id, order_id, line_no, menu_item_id, is_custom, name, unit_price, quantity, subtotal, notes) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(item.id)
        .bind(item.order_id)
        .bind(line_no as i64)
        .bind(item.menu_item_id)
        .bind(item.is_custom)
        .bind(&item.name)
        .bind(item.unit_price)
        .bind(item.quantity)
        .bind(item.subtotal)
        .bind(&item.notes)
        .execute(&mut *conn)
        .await?;
    }

    for addon in addons {
        sqlx::query(
            "INSERT INTO order_item_addons \
             (id, order_item_id, addon_item_id, name, unit_price, quantity, subtotal) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(addon.id)
        .bind(addon.order_item_id)
        .bind(addon.addon_item_id)
        .bind(&addon.name)
        .bind(addon.unit_price)
        .bind(addon.quantity)
        .bind(addon.subtotal)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Remove every line and add-on of an order
pub async fn delete_lines(conn: &mut SqliteConnection, order_id: i64) -> RepoResult<()> {
    sqlx::query(
        "DELETE FROM order_item_addons \
         WHERE order_item_id IN (SELECT id FROM order_items WHERE order_id = ?)",
    )
    .bind(order_id)
    .execute(&mut *conn)
    .await?;
    sqlx::query("DELETE FROM order_items WHERE order_id = ?")
        .bind(order_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Persist the editable columns of `order` (totals, table, notes, edit
/// metadata) provided the row is still at `order.version`. Returns `false`
/// when any other write landed since the caller read it.
pub async fn save_edit(db: impl SqliteExecutor<'_>, order: &Order) -> RepoResult<bool> {
    let rows = sqlx::query(
        r#"
        UPDATE orders SET
            table_number = ?, notes = ?,
            subtotal = ?, tax_amount = ?, service_charge_amount = ?,
            packaging_fee_amount = ?, delivery_fee_amount = ?,
            discount_amount = ?, total_amount = ?,
            edited_at = ?, edited_by = ?, updated_at = ?,
            version = version + 1
        WHERE id = ? AND version = ?
        "#,
    )
    .bind(&order.table_number)
    .bind(&order.notes)
    .bind(order.subtotal)
    .bind(order.tax_amount)
    .bind(order.service_charge_amount)
    .bind(order.packaging_fee_amount)
    .bind(order.delivery_fee_amount)
    .bind(order.discount_amount)
    .bind(order.total_amount)
    .bind(order.edited_at)
    .bind(order.edited_by)
    .bind(order.updated_at)
    .bind(order.id)
    .bind(order.version)
    .execute(db)
    .await?
    .rows_affected();
    Ok(rows == 1)
}

/// Persist the monetary columns if the row is still at `order.version`
pub async fn save_totals(db: impl SqliteExecutor<'_>, order: &Order) -> RepoResult<bool> {
    let rows = sqlx::query(
        r#"
        UPDATE orders SET
            subtotal = ?, tax_amount = ?, service_charge_amount = ?,
            packaging_fee_amount = ?, delivery_fee_amount = ?,
            discount_amount = ?, total_amount = ?, updated_at = ?,
            version = version + 1
        WHERE id = ? AND version = ?
        "#,
    )
    .bind(order.subtotal)
    .bind(order.tax_amount)
    .bind(order.service_charge_amount)
    .bind(order.packaging_fee_amount)
    .bind(order.delivery_fee_amount)
    .bind(order.discount_amount)
    .bind(order.total_amount)
    .bind(order.updated_at)
    .bind(order.id)
    .bind(order.version)
    .execute(db)
    .await?
    .rows_affected();
    Ok(rows == 1)
}

/// Compare-and-set on the status column. When `delivered_at` is given the
/// delivery sub-status is forced to `DELIVERED` in the same write.
pub async fn update_status(
    db: impl SqliteExecutor<'_>,
    id: i64,
    from: OrderStatus,
    to: OrderStatus,
    delivered_at: Option<i64>,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        r#"
        UPDATE orders SET
            status = ?,
            delivery_status = CASE WHEN ? IS NULL THEN delivery_status ELSE ? END,
            delivered_at = COALESCE(?, delivered_at),
            updated_at = ?,
            version = version + 1
        WHERE id = ? AND status = ?
        "#,
    )
    .bind(to)
    .bind(delivered_at)
    .bind(DeliveryStatus::Delivered)
    .bind(delivered_at)
    .bind(now)
    .bind(id)
    .bind(from)
    .execute(db)
    .await?
    .rows_affected();
    Ok(rows == 1)
}

pub async fn set_stock_deducted_at(
    db: impl SqliteExecutor<'_>,
    id: i64,
    deducted_at: Option<i64>,
    now: i64,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE orders SET stock_deducted_at = ?, updated_at = ?, version = version + 1 \
         WHERE id = ?",
    )
    .bind(deducted_at)
    .bind(now)
    .bind(id)
    .execute(db)
    .await?;
    Ok(())
}

/// Compare-and-set on the delivery sub-status
pub async fn update_delivery_status(
    db: impl SqliteExecutor<'_>,
    id: i64,
    from: Option<DeliveryStatus>,
    to: DeliveryStatus,
    delivered_at: Option<i64>,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE orders SET delivery_status = ?, delivered_at = COALESCE(?, delivered_at), \
         updated_at = ?, version = version + 1 \
         WHERE id = ? AND delivery_status IS ?",
    )
    .bind(to)
    .bind(delivered_at)
    .bind(now)
    .bind(id)
    .bind(from)
    .execute(db)
    .await?
    .rows_affected();
    Ok(rows == 1)
}
