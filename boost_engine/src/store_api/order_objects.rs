use serde::Deserialize;
use serde_json::Value;

use crate::db_types::Period;

/// A raw order request as submitted by a customer. Nothing here is trusted: the order flow API
/// validates every field against the catalog and prices the order server-side before anything is
/// persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderRequest {
    pub service_id: i64,
    pub service_option_id: i64,
    pub quantity: i64,
    /// Values for the option's `required_fields` schema, e.g. the profile link to boost.
    #[serde(default)]
    pub custom_data: Value,
    /// Overrides the option's default billing period when given.
    #[serde(default)]
    pub period: Option<Period>,
    #[serde(default)]
    pub interval: Option<i64>,
    #[serde(default)]
    pub notes: String,
}
