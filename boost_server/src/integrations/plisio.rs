//! Adapts the Plisio client to the engine's [`PaymentGateway`] contract.
use boost_engine::traits::{GatewayError, Invoice, InvoiceRequest, PaymentGateway};
use plisio_tools::{InvoiceParams, PlisioApi, PlisioApiError};

#[derive(Clone)]
pub struct PlisioGateway(PlisioApi);

impl PlisioGateway {
    pub fn new(api: PlisioApi) -> Self {
        Self(api)
    }
}

impl PaymentGateway for PlisioGateway {
    async fn create_invoice(&self, request: &InvoiceRequest) -> Result<Invoice, GatewayError> {
        let params = InvoiceParams {
            source_currency: request.source_currency.clone(),
            source_amount: request.amount.to_decimal().to_string(),
            order_number: request.order_number.clone(),
            order_name: "Boostgate balance top-up".to_string(),
            email: request.email.clone(),
            callback_url: request.callback_url.clone(),
            currency: request.target_currency.clone(),
        };
        let data = self.0.create_invoice(&params).await.map_err(to_gateway_error)?;
        Ok(Invoice { invoice_id: data.txn_id, invoice_url: data.invoice_url, invoice_total_sum: data.invoice_total_sum })
    }
}

fn to_gateway_error(e: PlisioApiError) -> GatewayError {
    match e {
        PlisioApiError::Timeout => GatewayError::Unavailable("The gateway did not respond in time".into()),
        PlisioApiError::RequestError(m) | PlisioApiError::Initialization(m) => GatewayError::Unavailable(m),
        PlisioApiError::QueryError { status, message } => GatewayError::Rejected { status, message },
        PlisioApiError::ApiError(m) => GatewayError::Rejected { status: 200, message: m },
        PlisioApiError::JsonError(m) => GatewayError::InvalidResponse(m),
    }
}
