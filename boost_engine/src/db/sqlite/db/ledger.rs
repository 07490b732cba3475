//! The append-only balance ledger. Rows are only ever inserted here; there is deliberately no
//! update or delete function in this module.
use bg_common::Money;
use sqlx::SqliteConnection;

use crate::{
    db_types::{BalanceEntry, TransactionType},
    traits::AccountApiError,
};

/// Appends a ledger entry recording a balance transition. Must be called in the same transaction
/// as the balance write it records.
pub async fn insert_entry(
    user_id: i64,
    old_balance: Money,
    new_balance: Money,
    currency: &str,
    transaction_type: TransactionType,
    order_id: Option<i64>,
    conn: &mut SqliteConnection,
) -> Result<BalanceEntry, sqlx::Error> {
    let entry = sqlx::query_as::<_, BalanceEntry>(
        r#"INSERT INTO balance_history (user_id, old_balance, new_balance, currency, transaction_type, order_id)
           VALUES ($1, $2, $3, $4, $5, $6)
           RETURNING *"#,
    )
    .bind(user_id)
    .bind(old_balance)
    .bind(new_balance)
    .bind(currency)
    .bind(transaction_type)
    .bind(order_id)
    .fetch_one(conn)
    .await?;
    Ok(entry)
}

pub async fn history_for_user(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<BalanceEntry>, AccountApiError> {
    let entries = sqlx::query_as::<_, BalanceEntry>(
        r#"SELECT id, user_id, old_balance, new_balance, currency, transaction_type, order_id, created_at
           FROM balance_history WHERE user_id = $1 ORDER BY created_at, id"#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(entries)
}
