//! # Boostgate engine public API
//!
//! The `store_api` module exposes the programmatic API for the Boostgate engine. The API is
//! modular, so that clients can pick and choose the functionality they want.
//!
//! * [`order_flow_api`] handles order placement (validation, pricing, the atomic pay-and-create
//!   step) and fulfilment transitions.
//! * [`catalog_api`] manages services, service options and per-user discount overrides.
//! * [`wallet_api`] provides balance and ledger queries, user registration and manual admin
//!   deposits.
//! * [`top_up_api`] drives the top-up flow against the external payment gateway and reconciles
//!   its payment notifications.
//!
//! The pattern for using all the APIs is the same. An API instance is created by supplying a
//! database backend that implements the backend traits required by the API.
pub mod catalog_api;
pub mod order_flow_api;
pub mod order_objects;
pub mod top_up_api;
pub mod wallet_api;
