use bg_common::Money;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

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
    pricing::PricingError,
    traits::{AccountApiError, AccountManagement, GatewayError},
};

//--------------------------------------    WalletError      ---------------------------------------------------------
#[derive(Debug, Clone, Error)]
pub enum WalletError {
    #[error("Insufficient funds: {required} required but only {available} available")]
    InsufficientFunds { required: Money, available: Money },
    #[error("The amount must be greater than zero. Got {0}")]
    InvalidAmount(Money),
    #[error("Currency mismatch: wallet holds {wallet} but the operation is in {operation}")]
    CurrencyMismatch { wallet: String, operation: String },
    #[error("The requested user id {0} does not exist")]
    UserNotFound(i64),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for WalletError {
    fn from(e: sqlx::Error) -> Self {
        WalletError::DatabaseError(e.to_string())
    }
}

impl From<AccountApiError> for WalletError {
    fn from(e: AccountApiError) -> Self {
        match e {
            AccountApiError::UserNotFound(id) => WalletError::UserNotFound(id),
            e => WalletError::DatabaseError(e.to_string()),
        }
    }
}

//--------------------------------------     OrderError      ---------------------------------------------------------
#[derive(Debug, Clone, Error)]
pub enum OrderError {
    #[error("The service option does not exist or does not belong to the selected service")]
    InvalidServiceOption,
    #[error("For the selected option, you need to specify an interval between 1 and 60")]
    IntervalRequired,
    #[error("{0}")]
    Pricing(#[from] PricingError),
    #[error("{0}")]
    Wallet(#[from] WalletError),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(i64),
    #[error("Order {id} cannot move from {from} to {to}")]
    InvalidTransition { id: i64, from: OrderStatusType, to: OrderStatusType },
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for OrderError {
    fn from(e: sqlx::Error) -> Self {
        OrderError::DatabaseError(e.to_string())
    }
}

impl From<AccountApiError> for OrderError {
    fn from(e: AccountApiError) -> Self {
        OrderError::DatabaseError(e.to_string())
    }
}

//--------------------------------------     TopUpError      ---------------------------------------------------------
#[derive(Debug, Clone, Error)]
pub enum TopUpError {
    #[error("The top-up amount must be greater than zero. Got {0}")]
    InvalidAmount(Money),
    #[error("The payment gateway is unavailable. {0}")]
    GatewayUnavailable(#[from] GatewayError),
    #[error("A top-up with invoice id {0} already exists")]
    DuplicateInvoice(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for TopUpError {
    fn from(e: sqlx::Error) -> Self {
        TopUpError::DatabaseError(e.to_string())
    }
}

impl From<AccountApiError> for TopUpError {
    fn from(e: AccountApiError) -> Self {
        TopUpError::DatabaseError(e.to_string())
    }
}

//--------------------------------------    WebhookError     ---------------------------------------------------------
#[derive(Debug, Clone, Error)]
pub enum WebhookError {
    #[error("The webhook payload is malformed: {0}")]
    MalformedPayload(String),
    #[error("No top-up exists for invoice id {0}")]
    UnknownInvoice(String),
    #[error("{0}")]
    Wallet(#[from] WalletError),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for WebhookError {
    fn from(e: sqlx::Error) -> Self {
        WebhookError::DatabaseError(e.to_string())
    }
}

impl From<AccountApiError> for WebhookError {
    fn from(e: AccountApiError) -> Self {
        WebhookError::DatabaseError(e.to_string())
    }
}

//--------------------------------------  TopUpSettlement    ---------------------------------------------------------
/// The result of asking the backend to move a top-up into a terminal state.
#[derive(Debug, Clone)]
pub enum TopUpSettlement {
    /// This call performed the transition. `credit` is present iff the new status was `Paid`.
    Settled { top_up: TopUp, credit: Option<BalanceEntry> },
    /// The top-up was already in a terminal state; nothing was changed. Redeliveries land here.
    AlreadySettled(TopUp),
}

//--------------------------------------   StoreDatabase     ---------------------------------------------------------
/// The mutating surface a backend must implement to power the store.
///
/// Atomicity contract: every method that touches `users.balance` commits the balance write, its
/// ledger append, and any sibling row (order insert, top-up status flip) in ONE transaction.
/// Concurrent operations against the same user's balance serialize; a conditional
/// check-and-debit must never allow two debits to overdraw a balance sufficient for only one.
#[allow(async_fn_in_trait)]
pub trait StoreDatabase: Clone + AccountManagement {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Creates a new user with a zero balance. Users start inactive until their email is
    /// confirmed upstream.
    async fn register_user(&self, user: NewUser) -> Result<User, AccountApiError>;

    /// Admin: creates a new service.
    async fn create_service(&self, service: NewService) -> Result<Service, AccountApiError>;

    /// Admin: creates a new service option. The unit price must be positive.
    async fn create_service_option(&self, option: NewServiceOption) -> Result<ServiceOption, AccountApiError>;

    /// Admin: sets (or replaces) the per-user discount override for a service option.
    async fn set_user_discount(
        &self,
        user_id: i64,
        option_id: i64,
        discount: DiscountBps,
    ) -> Result<(), AccountApiError>;

    /// Takes a fully priced order and, in a single atomic transaction:
    /// * debits the owner's balance by `total_price`, failing with
    ///   [`WalletError::InsufficientFunds`] if the balance cannot cover it,
    /// * appends a `Purchase` ledger entry referencing the order,
    /// * inserts the order in `Pending` status.
    ///
    /// If any step fails, none of them apply. In particular the debit never survives a failed
    /// order insert.
    async fn create_paid_order(&self, order: NewOrder) -> Result<Order, OrderError>;

    /// Transitions an order to `Running`, stamping `completed_at` with the supplied deadline.
    /// Fails with [`OrderError::InvalidTransition`] unless the order is currently `Pending`.
    async fn start_order(&self, order_id: i64, deadline: Option<DateTime<Utc>>) -> Result<Order, OrderError>;

    /// Transitions an order to `Completed`, stamping the completion time and the identity of the
    /// admin who completed it. Valid from `Pending` or `Running`.
    async fn complete_order(&self, order_id: i64, completed_by: &str) -> Result<Order, OrderError>;

    /// Credits the user's balance and appends a ledger entry of the given type, atomically.
    /// The amount must be positive. This is the only sanctioned path for deposits, including
    /// manual admin deposits.
    async fn credit_balance(
        &self,
        user_id: i64,
        amount: Money,
        transaction_type: TransactionType,
        order_id: Option<i64>,
    ) -> Result<BalanceEntry, WalletError>;

    /// Persists a new `Pending` top-up keyed by the gateway invoice id. Fails with
    /// [`TopUpError::DuplicateInvoice`] if the invoice id is already taken.
    async fn insert_top_up(&self, top_up: NewTopUp) -> Result<TopUp, TopUpError>;

    /// Moves the top-up with the given invoice id from `Pending` into `new_status`, atomically
    /// crediting the owner's balance (with a `Deposit` ledger entry) when the new status is
    /// `Paid`.
    ///
    /// The status flip is conditional on the row still being `Pending`, which makes this method
    /// the idempotency gate: a redelivered or concurrently delivered notification finds the row
    /// already terminal and gets [`TopUpSettlement::AlreadySettled`] with no balance change.
    async fn settle_top_up(
        &self,
        invoice_id: &str,
        new_status: TopUpStatus,
    ) -> Result<TopUpSettlement, WebhookError>;

    /// Marks `Pending` top-ups older than `older_than` as `Expired`. Returns the expired rows.
    async fn expire_stale_top_ups(&self, older_than: Duration) -> Result<Vec<TopUp>, TopUpError>;

    /// Completes `Running` orders whose auto-computed deadline has passed. Returns them.
    async fn complete_overdue_orders(&self, completed_by: &str) -> Result<Vec<Order>, OrderError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), AccountApiError> {
        Ok(())
    }
}
