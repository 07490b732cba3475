use chrono::{DateTime, Utc};
use log::debug;
use sqlx::{types::Json, SqliteConnection};

use crate::{
    db_types::{NewOrder, Order},
    traits::{AccountApiError, OrderError},
};

/// Inserts a fully priced order in `Pending` status. Must be called inside the same transaction
/// as the wallet debit that pays for it.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, OrderError> {
    let order = sqlx::query_as::<_, Order>(
        r#"INSERT INTO orders
           (user_id, service_id, service_option_id, custom_data, quantity, unit_price, total_price,
            currency, status, period, interval, notes)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'Pending', $9, $10, $11)
           RETURNING *"#,
    )
    .bind(order.user_id)
    .bind(order.service_id)
    .bind(order.service_option_id)
    .bind(Json(order.custom_data))
    .bind(order.quantity)
    .bind(order.unit_price)
    .bind(order.total_price)
    .bind(&order.currency)
    .bind(order.period)
    .bind(order.interval)
    .bind(&order.notes)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Order #{} for user #{} saved ({} x {})", order.id, order.user_id, order.quantity, order.unit_price);
    Ok(order)
}

pub async fn fetch_order_by_id(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, AccountApiError> {
    let order = sqlx::query_as::<_, Order>(
        r#"SELECT id, user_id, service_id, service_option_id, custom_data, quantity, unit_price, total_price,
                  currency, status, period, interval, notes, created_at, completed_at, completed_by
           FROM orders WHERE id = $1"#,
    )
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

pub async fn fetch_orders_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, AccountApiError> {
    let orders = sqlx::query_as::<_, Order>(
        r#"SELECT id, user_id, service_id, service_option_id, custom_data, quantity, unit_price, total_price,
                  currency, status, period, interval, notes, created_at, completed_at, completed_by
           FROM orders WHERE user_id = $1 ORDER BY created_at, id"#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(orders)
}

/// Moves a `Pending` order to `Running`, stamping `completed_at` with the auto-completion
/// deadline, if any. Returns `None` when the order is not currently `Pending` (or absent).
pub async fn start_order(
    order_id: i64,
    deadline: Option<DateTime<Utc>>,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, OrderError> {
    let order = sqlx::query_as::<_, Order>(
        r#"UPDATE orders SET status = 'Running', completed_at = $2
           WHERE id = $1 AND status = 'Pending'
           RETURNING *"#,
    )
    .bind(order_id)
    .bind(deadline)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Moves a `Pending` or `Running` order to `Completed`. Returns `None` when the order is already
/// `Completed` (or absent).
pub async fn complete_order(
    order_id: i64,
    completed_by: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, OrderError> {
    let order = sqlx::query_as::<_, Order>(
        r#"UPDATE orders SET status = 'Completed', completed_at = CURRENT_TIMESTAMP, completed_by = $2
           WHERE id = $1 AND status IN ('Pending', 'Running')
           RETURNING *"#,
    )
    .bind(order_id)
    .bind(completed_by)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Completes every `Running` order whose deadline has passed. The deadline stays in
/// `completed_at`; only the status and the completing identity change.
pub async fn complete_overdue(completed_by: &str, conn: &mut SqliteConnection) -> Result<Vec<Order>, OrderError> {
    let orders = sqlx::query_as::<_, Order>(
        r#"UPDATE orders SET status = 'Completed', completed_by = $1
           WHERE status = 'Running' AND completed_at IS NOT NULL AND datetime(completed_at) <= datetime('now')
           RETURNING *"#,
    )
    .bind(completed_by)
    .fetch_all(conn)
    .await?;
    Ok(orders)
}
