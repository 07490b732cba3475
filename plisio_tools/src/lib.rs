//! A minimal client for the Plisio crypto payment gateway.
//!
//! Covers the two interactions the store needs: creating invoices, and verifying the
//! `verify_hash` signature on the payment notifications Plisio posts back to us.
mod api;
mod config;
mod error;

mod data_objects;
pub mod helpers;

pub use api::PlisioApi;
pub use config::PlisioConfig;
pub use data_objects::{CallbackPayload, InvoiceData, InvoiceParams};
pub use error::{PlisioApiError, SignatureError};
