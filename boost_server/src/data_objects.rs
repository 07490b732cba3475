use bg_common::Money;
use boost_engine::db_types::{DiscountBps, NewServiceOption, Period};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The catch-all response body for endpoints with nothing more interesting to say.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Into<String>>(message: S) -> Self {
        Self { success: true, message: message.into() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTopUpRequest {
    pub amount: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopUpResponse {
    pub top_up_id: i64,
    pub invoice_id: String,
    /// Where the customer goes to pay.
    pub invoice_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub user_id: i64,
    pub balance: Money,
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DepositRequest {
    pub user_id: i64,
    pub amount: Money,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscountRequest {
    pub user_id: i64,
    pub service_option_id: i64,
    pub discount: DiscountBps,
}

/// A new option for an existing service. The service id comes from the URL path, so it is not
/// part of the body.
#[derive(Debug, Clone, Deserialize)]
pub struct NewServiceOptionRequest {
    pub name: String,
    pub unit_price: Money,
    #[serde(default)]
    pub discount: DiscountBps,
    #[serde(default)]
    pub period: Option<Period>,
    #[serde(default)]
    pub is_interval_required: bool,
    #[serde(default)]
    pub required_fields: Value,
}

impl NewServiceOptionRequest {
    pub fn into_new_option(self, service_id: i64) -> NewServiceOption {
        NewServiceOption {
            service_id,
            name: self.name,
            unit_price: self.unit_price,
            discount: self.discount,
            period: self.period,
            is_interval_required: self.is_interval_required,
            required_fields: self.required_fields,
        }
    }
}
