use bg_common::Money;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What we ask the gateway to invoice.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceRequest {
    pub amount: Money,
    pub source_currency: String,
    /// The crypto currency the customer pays in, if fixed. `None` lets the customer choose.
    pub target_currency: Option<String>,
    /// Our process-unique correlation id for this top-up.
    pub order_number: String,
    pub email: String,
    pub callback_url: String,
}

/// What the gateway hands back for a successfully created invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_id: String,
    pub invoice_url: String,
    pub invoice_total_sum: String,
}

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("The payment gateway could not be reached: {0}")]
    Unavailable(String),
    #[error("The payment gateway rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("The payment gateway returned a malformed response: {0}")]
    InvalidResponse(String),
}

/// The outbound payment-gateway collaborator. Implementations are constructed explicitly with
/// their configuration (API key, base URL, timeout) and injected into the top-up API.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway: Clone {
    async fn create_invoice(&self, request: &InvoiceRequest) -> Result<Invoice, GatewayError>;
}
