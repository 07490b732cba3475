use thiserror::Error;

use crate::db_types::{BalanceEntry, DiscountBps, Order, Service, ServiceOption, TopUp, User};

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User error constructing query: {0}")]
    QueryError(String),
    #[error("The requested user id {0} does not exist")]
    UserNotFound(i64),
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}

/// Read-only queries over users, the catalog, orders, the ledger and top-ups.
#[allow(async_fn_in_trait)]
pub trait AccountManagement: Clone {
    async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, AccountApiError>;

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, AccountApiError>;

    async fn fetch_service(&self, service_id: i64) -> Result<Option<Service>, AccountApiError>;

    async fn fetch_service_option(&self, option_id: i64) -> Result<Option<ServiceOption>, AccountApiError>;

    /// Fetches the per-user discount override for the given (user, option) pair, if any.
    /// At most one override can exist per pair (enforced by a UNIQUE constraint).
    async fn fetch_user_discount(
        &self,
        user_id: i64,
        option_id: i64,
    ) -> Result<Option<DiscountBps>, AccountApiError>;

    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, AccountApiError>;

    /// All orders for the user, oldest first.
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AccountApiError>;

    /// The user's ledger, oldest first.
    async fn fetch_balance_history(&self, user_id: i64) -> Result<Vec<BalanceEntry>, AccountApiError>;

    async fn fetch_top_up_by_invoice(&self, invoice_id: &str) -> Result<Option<TopUp>, AccountApiError>;

    async fn fetch_top_ups_for_user(&self, user_id: i64) -> Result<Vec<TopUp>, AccountApiError>;
}
