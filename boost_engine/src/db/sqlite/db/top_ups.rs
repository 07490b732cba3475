use chrono::{DateTime, Utc};
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewTopUp, TopUp, TopUpStatus},
    traits::{AccountApiError, TopUpError},
};

pub async fn insert_top_up(top_up: NewTopUp, conn: &mut SqliteConnection) -> Result<TopUp, TopUpError> {
    let result = sqlx::query_as::<_, TopUp>(
        r#"INSERT INTO top_ups (user_id, amount, currency, invoice_id, status)
           VALUES ($1, $2, $3, $4, 'Pending')
           RETURNING *"#,
    )
    .bind(top_up.user_id)
    .bind(top_up.amount)
    .bind(&top_up.currency)
    .bind(&top_up.invoice_id)
    .fetch_one(conn)
    .await;
    match result {
        Err(sqlx::Error::Database(de)) if de.is_unique_violation() => {
            Err(TopUpError::DuplicateInvoice(top_up.invoice_id))
        },
        Err(e) => Err(e.into()),
        Ok(top_up) => {
            debug!("🗃️ Top-up #{} ({}) recorded for invoice [{}]", top_up.id, top_up.amount, top_up.invoice_id);
            Ok(top_up)
        },
    }
}

pub async fn fetch_by_invoice_id(
    invoice_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<TopUp>, AccountApiError> {
    let top_up = sqlx::query_as::<_, TopUp>(
        r#"SELECT id, user_id, amount, currency, invoice_id, status, created_at, updated_at
           FROM top_ups WHERE invoice_id = $1"#,
    )
    .bind(invoice_id)
    .fetch_optional(conn)
    .await?;
    Ok(top_up)
}

pub async fn fetch_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<TopUp>, AccountApiError> {
    let top_ups = sqlx::query_as::<_, TopUp>(
        r#"SELECT id, user_id, amount, currency, invoice_id, status, created_at, updated_at
           FROM top_ups WHERE user_id = $1 ORDER BY created_at, id"#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(top_ups)
}

/// Flips the top-up into `new_status` iff it is still `Pending`. This conditional update is the
/// idempotency gate for gateway notifications: exactly one of any number of concurrent or
/// redelivered notifications wins the flip and gets `Some(row)` back.
pub async fn try_settle(
    invoice_id: &str,
    new_status: TopUpStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<TopUp>, sqlx::Error> {
    let top_up = sqlx::query_as::<_, TopUp>(
        r#"UPDATE top_ups SET status = $1, updated_at = CURRENT_TIMESTAMP
           WHERE invoice_id = $2 AND status = 'Pending'
           RETURNING *"#,
    )
    .bind(new_status)
    .bind(invoice_id)
    .fetch_optional(conn)
    .await?;
    Ok(top_up)
}

/// Expires every `Pending` top-up created at or before `cutoff`. Returns the expired rows.
pub async fn expire_stale(cutoff: DateTime<Utc>, conn: &mut SqliteConnection) -> Result<Vec<TopUp>, sqlx::Error> {
    let expired = sqlx::query_as::<_, TopUp>(
        r#"UPDATE top_ups SET status = 'Expired', updated_at = CURRENT_TIMESTAMP
           WHERE status = 'Pending' AND datetime(created_at) <= datetime($1)
           RETURNING *"#,
    )
    .bind(cutoff)
    .fetch_all(conn)
    .await?;
    if !expired.is_empty() {
        debug!("🗃️ Expired {} stale top-up(s)", expired.len());
    }
    Ok(expired)
}
