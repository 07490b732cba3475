//! Boostgate engine
//!
//! The engine contains the core business logic for the Boostgate store: wallet balances, the
//! append-only balance ledger, order placement and fulfilment, and top-up reconciliation against
//! an external payment gateway.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@db`]). SQLite is the supported backend. You should
//!    never need to access the database directly; use the public API instead. The exception is
//!    the data types used in the database, defined in the `db_types` module, which are public.
//! 2. The engine public API ([`mod@store_api`]). This provides the public-facing functionality:
//!    placing and completing orders, reading balances and history, requesting top-ups and
//!    reconciling gateway payment notifications. Backends implement the traits in [`mod@traits`]
//!    to plug into these APIs.
//!
//! Two invariants hold everywhere:
//! * The only code that writes to `users.balance` lives in `sqlite/db/users.rs`, and every such
//!   write is paired with exactly one `balance_history` insert in the same transaction.
//! * `balance_history` rows are never updated or deleted.
mod db;

pub mod db_types;
pub mod pricing;
mod store_api;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::SqliteDatabase;
pub use store_api::{
    catalog_api::CatalogApi,
    order_flow_api::OrderFlowApi,
    order_objects::NewOrderRequest,
    top_up_api::{TopUpApi, WebhookOutcome},
    wallet_api::WalletApi,
};
pub use traits::{
    AccountApiError,
    AccountManagement,
    OrderError,
    StoreDatabase,
    TopUpError,
    TopUpSettlement,
    WalletError,
    WebhookError,
};
