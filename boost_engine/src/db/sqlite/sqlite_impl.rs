//! `SqliteDatabase` is a concrete implementation of a Boostgate engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the
//! [`crate::traits`] module. All balance writes happen inside transactions here, paired with
//! their ledger appends; the low-level functions in [`super::db`] never commit on their own.
use std::fmt::Debug;

use bg_common::{Money, CURRENCY_CODE};
use chrono::{DateTime, Duration, Utc};
use log::*;
use sqlx::SqlitePool;

use super::db::{catalog, db_url, ledger, new_pool, orders, top_ups, users};
use crate::{
    db_types::{
        BalanceEntry,
        DiscountBps,
        NewOrder,
        NewService,
        NewServiceOption,
        NewTopUp,
        NewUser,
        Order,
        OrderStatusType,
        Service,
        ServiceOption,
        TopUp,
        TopUpStatus,
        TransactionType,
        User,
    },
    traits::{
        AccountApiError,
        AccountManagement,
        OrderError,
        StoreDatabase,
        TopUpError,
        TopUpSettlement,
        WalletError,
        WebhookError,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database connection pool using the URL from the `BG_DATABASE_URL` env var.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_user_by_id(user_id, &mut conn).await
    }

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_user_by_email(email, &mut conn).await
    }

    async fn fetch_service(&self, service_id: i64) -> Result<Option<Service>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        catalog::fetch_service(service_id, &mut conn).await
    }

    async fn fetch_service_option(&self, option_id: i64) -> Result<Option<ServiceOption>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        catalog::fetch_service_option(option_id, &mut conn).await
    }

    async fn fetch_user_discount(
        &self,
        user_id: i64,
        option_id: i64,
    ) -> Result<Option<DiscountBps>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        catalog::user_discount(user_id, option_id, &mut conn).await
    }

    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_id(order_id, &mut conn).await
    }

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders_for_user(user_id, &mut conn).await
    }

    async fn fetch_balance_history(&self, user_id: i64) -> Result<Vec<BalanceEntry>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        ledger::history_for_user(user_id, &mut conn).await
    }

    async fn fetch_top_up_by_invoice(&self, invoice_id: &str) -> Result<Option<TopUp>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        top_ups::fetch_by_invoice_id(invoice_id, &mut conn).await
    }

    async fn fetch_top_ups_for_user(&self, user_id: i64) -> Result<Vec<TopUp>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        top_ups::fetch_for_user(user_id, &mut conn).await
    }
}

impl StoreDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn register_user(&self, user: NewUser) -> Result<User, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        users::insert_user(user, CURRENCY_CODE, &mut conn).await
    }

    async fn create_service(&self, service: NewService) -> Result<Service, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        catalog::insert_service(service, &mut conn).await
    }

    async fn create_service_option(&self, option: NewServiceOption) -> Result<ServiceOption, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        catalog::insert_service_option(option, CURRENCY_CODE, &mut conn).await
    }

    async fn set_user_discount(
        &self,
        user_id: i64,
        option_id: i64,
        discount: DiscountBps,
    ) -> Result<(), AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        catalog::set_user_discount(user_id, option_id, discount, &mut conn).await
    }

    /// Takes a fully priced order, and in a single atomic transaction,
    /// * debits the owner's balance by the order total, failing if the balance cannot cover it,
    /// * inserts the order in `Pending` status,
    /// * appends a `Purchase` ledger entry referencing the new order.
    ///
    /// The debit runs first so that the transaction opens with the conditional balance update;
    /// concurrent orders against the same wallet serialize on it.
    async fn create_paid_order(&self, order: NewOrder) -> Result<Order, OrderError> {
        let mut tx = self.pool.begin().await?;
        let (old_balance, new_balance) =
            users::debit_balance(order.user_id, order.total_price, &order.currency, &mut tx).await?;
        let order = orders::insert_order(order, &mut tx).await?;
        ledger::insert_entry(
            order.user_id,
            old_balance,
            new_balance,
            &order.currency,
            TransactionType::Purchase,
            Some(order.id),
            &mut tx,
        )
        .await?;
        tx.commit().await?;
        info!("🛒 Order #{} created and paid for ({}) by user #{}", order.id, order.total_price, order.user_id);
        Ok(order)
    }

    async fn start_order(&self, order_id: i64, deadline: Option<DateTime<Utc>>) -> Result<Order, OrderError> {
        let mut conn = self.pool.acquire().await?;
        match orders::start_order(order_id, deadline, &mut conn).await? {
            Some(order) => {
                info!("🛒 Order #{order_id} is now running. Deadline: {deadline:?}");
                Ok(order)
            },
            None => match orders::fetch_order_by_id(order_id, &mut conn).await? {
                None => Err(OrderError::OrderNotFound(order_id)),
                Some(order) => Err(OrderError::InvalidTransition {
                    id: order_id,
                    from: order.status,
                    to: OrderStatusType::Running,
                }),
            },
        }
    }

    async fn complete_order(&self, order_id: i64, completed_by: &str) -> Result<Order, OrderError> {
        let mut conn = self.pool.acquire().await?;
        match orders::complete_order(order_id, completed_by, &mut conn).await? {
            Some(order) => {
                info!("🛒 Order #{order_id} completed by {completed_by}");
                Ok(order)
            },
            None => match orders::fetch_order_by_id(order_id, &mut conn).await? {
                None => Err(OrderError::OrderNotFound(order_id)),
                Some(order) => Err(OrderError::InvalidTransition {
                    id: order_id,
                    from: order.status,
                    to: OrderStatusType::Completed,
                }),
            },
        }
    }

    /// The conditional update in [`users::credit_balance`] opens the transaction, the same way
    /// the debit does in [`Self::create_paid_order`], so the write lock is taken up front rather
    /// than after a read.
    async fn credit_balance(
        &self,
        user_id: i64,
        amount: Money,
        transaction_type: TransactionType,
        order_id: Option<i64>,
    ) -> Result<BalanceEntry, WalletError> {
        let mut tx = self.pool.begin().await?;
        let (old_balance, new_balance) = users::credit_balance(user_id, amount, CURRENCY_CODE, &mut tx).await?;
        let entry =
            ledger::insert_entry(user_id, old_balance, new_balance, CURRENCY_CODE, transaction_type, order_id, &mut tx)
                .await?;
        tx.commit().await?;
        info!("💰 {transaction_type} of {amount} credited to user #{user_id}");
        Ok(entry)
    }

    async fn insert_top_up(&self, top_up: NewTopUp) -> Result<TopUp, TopUpError> {
        let mut conn = self.pool.acquire().await?;
        top_ups::insert_top_up(top_up, &mut conn).await
    }

    /// Settles the top-up for `invoice_id`, atomically crediting the owner's balance (with a
    /// `Deposit` ledger entry) when the new status is `Paid`.
    ///
    /// The conditional status flip in [`top_ups::try_settle`] is the first statement of the
    /// transaction, so any number of concurrent or redelivered notifications produce exactly one
    /// credit; the losers see [`TopUpSettlement::AlreadySettled`].
    async fn settle_top_up(
        &self,
        invoice_id: &str,
        new_status: TopUpStatus,
    ) -> Result<TopUpSettlement, WebhookError> {
        if !new_status.is_terminal() {
            return Err(WebhookError::MalformedPayload(format!("{new_status} is not a terminal top-up status")));
        }
        let mut tx = self.pool.begin().await?;
        match top_ups::try_settle(invoice_id, new_status, &mut tx).await? {
            Some(top_up) => {
                let credit = if new_status == TopUpStatus::Paid {
                    let (old_balance, new_balance) =
                        users::credit_balance(top_up.user_id, top_up.amount, &top_up.currency, &mut tx).await?;
                    let entry = ledger::insert_entry(
                        top_up.user_id,
                        old_balance,
                        new_balance,
                        &top_up.currency,
                        TransactionType::Deposit,
                        None,
                        &mut tx,
                    )
                    .await?;
                    Some(entry)
                } else {
                    None
                };
                tx.commit().await?;
                info!("💰 Top-up [{invoice_id}] settled as {new_status}");
                Ok(TopUpSettlement::Settled { top_up, credit })
            },
            None => {
                drop(tx);
                let mut conn = self.pool.acquire().await?;
                match top_ups::fetch_by_invoice_id(invoice_id, &mut conn).await? {
                    Some(top_up) => {
                        debug!("💰 Top-up [{invoice_id}] is already {}. Ignoring.", top_up.status);
                        Ok(TopUpSettlement::AlreadySettled(top_up))
                    },
                    None => Err(WebhookError::UnknownInvoice(invoice_id.to_string())),
                }
            },
        }
    }

    async fn expire_stale_top_ups(&self, older_than: Duration) -> Result<Vec<TopUp>, TopUpError> {
        let cutoff = Utc::now() - older_than;
        let mut conn = self.pool.acquire().await?;
        let expired = top_ups::expire_stale(cutoff, &mut conn).await?;
        Ok(expired)
    }

    async fn complete_overdue_orders(&self, completed_by: &str) -> Result<Vec<Order>, OrderError> {
        let mut conn = self.pool.acquire().await?;
        let completed = orders::complete_overdue(completed_by, &mut conn).await?;
        if !completed.is_empty() {
            info!("🛒 Auto-completed {} overdue order(s)", completed.len());
        }
        Ok(completed)
    }

    async fn close(&mut self) -> Result<(), AccountApiError> {
        self.pool.close().await;
        Ok(())
    }
}
