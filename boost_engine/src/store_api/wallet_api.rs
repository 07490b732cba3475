use std::fmt::Debug;

use bg_common::Money;
use log::*;

use crate::{
    db_types::{BalanceEntry, NewUser, TransactionType, User},
    traits::{AccountApiError, StoreDatabase, WalletError},
};

/// `WalletApi` exposes balance and ledger queries, user registration and manual deposits.
///
/// It never debits. Debits only happen as part of order placement, inside the backend's atomic
/// pay-and-create transaction.
pub struct WalletApi<B> {
    db: B,
}

impl<B> Debug for WalletApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WalletApi")
    }
}

impl<B> WalletApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> WalletApi<B>
where B: StoreDatabase
{
    pub async fn register_user(&self, user: NewUser) -> Result<User, AccountApiError> {
        self.db.register_user(user).await
    }

    pub async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, AccountApiError> {
        self.db.fetch_user(user_id).await
    }

    pub async fn balance(&self, user_id: i64) -> Result<Money, AccountApiError> {
        let user = self.db.fetch_user(user_id).await?.ok_or(AccountApiError::UserNotFound(user_id))?;
        Ok(user.balance)
    }

    /// The user's full balance ledger, oldest first. Every balance the user has ever held
    /// appears here; consecutive entries chain (`new_balance` of one is `old_balance` of the
    /// next).
    pub async fn history(&self, user_id: i64) -> Result<Vec<BalanceEntry>, AccountApiError> {
        self.db.fetch_balance_history(user_id).await
    }

    /// Credits the user's wallet on behalf of an administrator. Lands in the ledger as an
    /// `AdminDeposit` so that manual corrections stay distinguishable from gateway top-ups.
    pub async fn admin_deposit(&self, user_id: i64, amount: Money) -> Result<BalanceEntry, WalletError> {
        let entry = self.db.credit_balance(user_id, amount, TransactionType::AdminDeposit, None).await?;
        info!("💰 Admin deposit of {amount} for user #{user_id}");
        Ok(entry)
    }
}
