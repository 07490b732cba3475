use serde::{Deserialize, Serialize};

/// Parameters for creating a new invoice. Everything here ends up in the query string of the
/// `invoices/new` call (alongside the API key, which the client adds itself).
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceParams {
    /// Fiat currency the amount is denominated in, e.g. "USD".
    pub source_currency: String,
    /// The amount in major units, e.g. "25.00".
    pub source_amount: String,
    /// Our correlation id for the invoice. Must be unique per request.
    pub order_number: String,
    pub order_name: String,
    pub email: String,
    pub callback_url: String,
    /// The crypto currency the customer pays in. Omitted to let the customer choose.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// The interesting subset of a successful `invoices/new` response.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceData {
    /// Plisio's id for the invoice. Payment notifications are keyed by this.
    pub txn_id: String,
    pub invoice_url: String,
    #[serde(default)]
    pub invoice_total_sum: String,
}

/// A payment notification as Plisio posts it to the callback URL. The raw JSON must be kept
/// around for signature verification; this struct is only deserialized after
/// [`crate::helpers::verify_callback`] has passed.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackPayload {
    pub txn_id: String,
    pub status: String,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub source_currency: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}
