//! Payment notification handler for the Plisio gateway.
//!
//! Plisio posts a JSON payload to the callback URL whenever an invoice changes state. The
//! payload carries its own HMAC signature in the `verify_hash` field, so verification happens
//! here against the raw body rather than in middleware. Only once the signature checks out is
//! the payload deserialized and handed to the engine for reconciliation.
use actix_web::{web, HttpResponse};
use boost_engine::{db_types::TopUpStatus, StoreDatabase, TopUpApi, WebhookOutcome};
use log::*;
use plisio_tools::{helpers::verify_callback, CallbackPayload};
use serde_json::Value;

use crate::{config::ServerConfig, data_objects::JsonResponse, errors::ServerError, integrations::PlisioGateway, route};

route!(plisio_webhook => Post "/plisio" impl StoreDatabase);
/// Route handler for Plisio payment notifications.
///
/// The flow is: verify the `verify_hash` signature over the raw payload, map the gateway status
/// onto a local top-up status, and settle through the engine's idempotency gate. Redelivered
/// notifications get a 200 and change nothing. Unknown invoices get a 404 so that a
/// misconfigured gateway shows up in its own delivery logs.
pub async fn plisio_webhook<B: StoreDatabase>(
    body: web::Bytes,
    config: web::Data<ServerConfig>,
    api: web::Data<TopUpApi<B, PlisioGateway>>,
) -> Result<HttpResponse, ServerError> {
    let payload = serde_json::from_slice::<Value>(&body)
        .map_err(|e| ServerError::InvalidRequestBody(format!("Notification is not valid JSON. {e}")))?;
    verify_callback(config.plisio.hmac_secret.reveal(), &payload).map_err(|e| {
        warn!("💳️ Rejecting payment notification with a bad signature. {e}");
        ServerError::from(e)
    })?;
    let notification = serde_json::from_value::<CallbackPayload>(payload)
        .map_err(|e| ServerError::InvalidRequestBody(format!("Notification is missing required fields. {e}")))?;
    debug!("💳️ Verified notification for invoice [{}]: {}", notification.txn_id, notification.status);
    let Some(new_status) = map_callback_status(&notification.status) else {
        trace!("💳️ Ignoring non-terminal notification status '{}'", notification.status);
        return Ok(HttpResponse::Ok().json(JsonResponse::success("Notification ignored")));
    };
    let outcome = api.process_payment_notification(&notification.txn_id, new_status).await?;
    let message = match outcome {
        WebhookOutcome::Credited { top_up, .. } => {
            format!("Top-up {} credited", top_up.id)
        },
        WebhookOutcome::Closed(top_up) => format!("Top-up {} closed as {}", top_up.id, top_up.status),
        WebhookOutcome::AlreadySettled(top_up) => format!("Top-up {} was already settled", top_up.id),
        WebhookOutcome::Ignored => "Notification ignored".to_string(),
    };
    Ok(HttpResponse::Ok().json(JsonResponse::success(message)))
}

/// Maps a Plisio invoice status onto the local top-up status, or `None` for statuses that do
/// not settle anything. `mismatch` means the customer paid a different amount than invoiced;
/// Plisio still releases the funds, so it settles as paid.
pub fn map_callback_status(status: &str) -> Option<TopUpStatus> {
    match status {
        "completed" | "mismatch" => Some(TopUpStatus::Paid),
        "expired" => Some(TopUpStatus::Expired),
        "error" | "cancelled" => Some(TopUpStatus::Failed),
        _ => None,
    }
}
