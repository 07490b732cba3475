//! # Boostgate server
//!
//! The HTTP front-end for the Boostgate store. It is responsible for:
//! * serving the customer API: placing orders, reading balances, history and top-ups,
//! * serving the admin API: fulfilment transitions, manual deposits, discount management,
//! * listening for payment notifications from the Plisio gateway and reconciling them,
//! * running the background sweep that expires stale top-ups and completes overdue orders.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more
//! information.
//!
//! ## Authentication
//! Token issuance lives upstream. The server trusts the identity headers set by the auth proxy
//! (`x-user-id`, `x-user-roles`), turns them into [`auth::UserClaims`] request extensions, and
//! enforces roles per route with the ACL middleware.
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod expiry_worker;
pub mod integrations;
pub mod middleware;
pub mod payment_routes;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
