use bg_common::Money;
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewUser, User},
    traits::{AccountApiError, WalletError},
};

pub async fn fetch_user_by_id(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, AccountApiError> {
    let user = sqlx::query_as::<_, User>(
        r#"SELECT id, email, balance, currency, rating, is_active, created_at, updated_at
           FROM users WHERE id = $1"#,
    )
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(user)
}

pub async fn fetch_user_by_email(email: &str, conn: &mut SqliteConnection) -> Result<Option<User>, AccountApiError> {
    let user = sqlx::query_as::<_, User>(
        r#"SELECT id, email, balance, currency, rating, is_active, created_at, updated_at
           FROM users WHERE email = $1"#,
    )
    .bind(email)
    .fetch_optional(conn)
    .await?;
    Ok(user)
}

pub async fn insert_user(user: NewUser, currency: &str, conn: &mut SqliteConnection) -> Result<User, AccountApiError> {
    let result = sqlx::query_as::<_, User>(
        r#"INSERT INTO users (email, balance, currency, rating) VALUES ($1, 0, $2, $3) RETURNING *"#,
    )
    .bind(&user.email)
    .bind(currency)
    .bind(user.rating)
    .fetch_one(conn)
    .await;
    match result {
        Err(sqlx::Error::Database(de)) if de.is_unique_violation() => {
            Err(AccountApiError::QueryError(format!("A user with email {} already exists", user.email)))
        },
        Err(e) => Err(e.into()),
        Ok(user) => {
            debug!("🧑️ New user #{} ({}) registered", user.id, user.email);
            Ok(user)
        },
    }
}

/// Debits `amount` from the user's balance, refusing to let the balance go negative.
///
/// The conditional `UPDATE` is the serialization gate. It is always the first statement the
/// caller's transaction executes against the `users` table, so under concurrent debits SQLite's
/// write lock decides an order and the `balance >= amount` guard sees each predecessor's result.
/// Returns the (old, new) balance pair on success.
pub async fn debit_balance(
    user_id: i64,
    amount: Money,
    currency: &str,
    conn: &mut SqliteConnection,
) -> Result<(Money, Money), WalletError> {
    if !amount.is_positive() {
        return Err(WalletError::InvalidAmount(amount));
    }
    let new_balance = sqlx::query_scalar::<_, Money>(
        r#"UPDATE users SET balance = balance - $1, updated_at = CURRENT_TIMESTAMP
           WHERE id = $2 AND currency = $3 AND balance >= $1
           RETURNING balance"#,
    )
    .bind(amount)
    .bind(user_id)
    .bind(currency)
    .fetch_optional(&mut *conn)
    .await?;
    match new_balance {
        Some(new) => {
            debug!("💸 Debited {amount} from user #{user_id}. New balance: {new}");
            Ok((new + amount, new))
        },
        None => match fetch_user_by_id(user_id, conn).await? {
            None => Err(WalletError::UserNotFound(user_id)),
            Some(user) if user.currency != currency => {
                Err(WalletError::CurrencyMismatch { wallet: user.currency, operation: currency.to_string() })
            },
            Some(user) => Err(WalletError::InsufficientFunds { required: amount, available: user.balance }),
        },
    }
}

/// Credits `amount` to the user's balance. Returns the (old, new) balance pair.
pub async fn credit_balance(
    user_id: i64,
    amount: Money,
    currency: &str,
    conn: &mut SqliteConnection,
) -> Result<(Money, Money), WalletError> {
    if !amount.is_positive() {
        return Err(WalletError::InvalidAmount(amount));
    }
    let new_balance = sqlx::query_scalar::<_, Money>(
        r#"UPDATE users SET balance = balance + $1, updated_at = CURRENT_TIMESTAMP
           WHERE id = $2 AND currency = $3
           RETURNING balance"#,
    )
    .bind(amount)
    .bind(user_id)
    .bind(currency)
    .fetch_optional(&mut *conn)
    .await?;
    match new_balance {
        Some(new) => {
            debug!("💸 Credited {amount} to user #{user_id}. New balance: {new}");
            Ok((new - amount, new))
        },
        None => match fetch_user_by_id(user_id, conn).await? {
            None => Err(WalletError::UserNotFound(user_id)),
            Some(user) => {
                Err(WalletError::CurrencyMismatch { wallet: user.currency, operation: currency.to_string() })
            },
        },
    }
}
