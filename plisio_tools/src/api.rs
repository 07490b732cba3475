use std::sync::Arc;

use log::*;
use reqwest::Client;
use serde_json::Value;

use crate::{config::PlisioConfig, data_objects::{InvoiceData, InvoiceParams}, error::PlisioApiError};

#[derive(Clone)]
pub struct PlisioApi {
    config: PlisioConfig,
    client: Arc<Client>,
}

impl PlisioApi {
    pub fn new(config: PlisioConfig) -> Result<Self, PlisioApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PlisioApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn callback_url(&self) -> &str {
        &self.config.callback_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    /// Creates a new invoice with Plisio. On success, Plisio's `txn_id` identifies the invoice
    /// from here on, including in payment notifications.
    pub async fn create_invoice(&self, params: &InvoiceParams) -> Result<InvoiceData, PlisioApiError> {
        let url = self.url("/invoices/new");
        trace!("Creating Plisio invoice for order {}", params.order_number);
        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("api_key", self.config.api_key.reveal().as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PlisioApiError::Timeout
                } else {
                    PlisioApiError::RequestError(e.to_string())
                }
            })?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| PlisioApiError::RequestError(e.to_string()))?;
            return Err(PlisioApiError::QueryError { status, message });
        }
        let body = response.json::<Value>().await.map_err(|e| PlisioApiError::JsonError(e.to_string()))?;
        if body["status"].as_str() != Some("success") {
            let message = body["data"]["message"].as_str().unwrap_or("unknown error").to_string();
            return Err(PlisioApiError::ApiError(message));
        }
        let data =
            serde_json::from_value::<InvoiceData>(body["data"].clone()).map_err(|e| PlisioApiError::JsonError(e.to_string()))?;
        info!("Created Plisio invoice [{}] for order {}", data.txn_id, params.order_number);
        Ok(data)
    }
}
