//! # Backend interface contracts.
//!
//! This module defines the behaviour a database backend must expose to power the engine APIs.
//!
//! * [`StoreDatabase`] is the mutating surface: wallet debits/credits, order creation and
//!   status transitions, top-up bookkeeping. Every balance mutation a backend performs must
//!   commit atomically with its ledger append.
//! * [`AccountManagement`] provides read-only queries over users, the catalog, orders, the
//!   ledger and top-ups.
//! * [`PaymentGateway`] is the outbound collaborator contract for creating invoices with the
//!   external payment provider. It is injected into the top-up API at construction time; there
//!   is no module-level gateway client.
mod account_management;
mod payment_gateway;
mod store_database;

pub use account_management::{AccountApiError, AccountManagement};
pub use payment_gateway::{GatewayError, Invoice, InvoiceRequest, PaymentGateway};
pub use store_database::{
    OrderError,
    StoreDatabase,
    TopUpError,
    TopUpSettlement,
    WalletError,
    WebhookError,
};
