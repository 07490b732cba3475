use std::fmt::Debug;

use bg_common::Money;
use chrono::Duration;
use log::*;
use rand::Rng;

use crate::{
    db_types::{BalanceEntry, NewTopUp, TopUp, TopUpStatus, User},
    traits::{
        AccountApiError,
        Invoice,
        InvoiceRequest,
        PaymentGateway,
        StoreDatabase,
        TopUpError,
        TopUpSettlement,
        WebhookError,
    },
};

/// What a gateway payment notification amounted to, once reconciled against the local top-up.
#[derive(Debug, Clone)]
pub enum WebhookOutcome {
    /// The top-up was settled as paid and the wallet credited. Exactly one notification per
    /// invoice ever produces this.
    Credited { top_up: TopUp, credit: BalanceEntry },
    /// The top-up was closed without payment (failed or expired).
    Closed(TopUp),
    /// The top-up was already in a terminal state. Nothing changed.
    AlreadySettled(TopUp),
    /// The notification carried a non-terminal status and was ignored.
    Ignored,
}

/// `TopUpApi` drives the balance top-up flow: creating invoices with the external payment
/// gateway, recording the pending top-up, and reconciling the gateway's payment notifications.
pub struct TopUpApi<B, G> {
    db: B,
    gateway: G,
    callback_url: String,
}

impl<B, G> Debug for TopUpApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TopUpApi")
    }
}

impl<B, G> TopUpApi<B, G> {
    pub fn new(db: B, gateway: G, callback_url: String) -> Self {
        Self { db, gateway, callback_url }
    }
}

impl<B, G> TopUpApi<B, G>
where
    B: StoreDatabase,
    G: PaymentGateway,
{
    /// Requests a top-up of `amount` for `user`.
    ///
    /// An invoice is created with the payment gateway first; only once the gateway has accepted
    /// it is a `Pending` top-up recorded locally, keyed by the gateway's invoice id. The wallet
    /// is NOT credited here. Credit happens when the gateway's payment notification is
    /// reconciled in [`Self::process_payment_notification`].
    pub async fn request_top_up(&self, user: &User, amount: Money) -> Result<(TopUp, Invoice), TopUpError> {
        if !amount.is_positive() {
            return Err(TopUpError::InvalidAmount(amount));
        }
        let order_number = new_order_number(user.id);
        let request = InvoiceRequest {
            amount,
            source_currency: user.currency.clone(),
            target_currency: None,
            order_number,
            email: user.email.clone(),
            callback_url: self.callback_url.clone(),
        };
        let invoice = self.gateway.create_invoice(&request).await?;
        debug!("💳️ Gateway accepted invoice [{}] for user #{}", invoice.invoice_id, user.id);
        let top_up = self
            .db
            .insert_top_up(NewTopUp {
                user_id: user.id,
                amount,
                currency: user.currency.clone(),
                invoice_id: invoice.invoice_id.clone(),
            })
            .await?;
        info!("💳️ Top-up #{} of {amount} requested by user #{}. Invoice: [{}]", top_up.id, user.id, top_up.invoice_id);
        Ok((top_up, invoice))
    }

    /// Reconciles a (signature-verified) gateway payment notification against the local top-up.
    ///
    /// Non-terminal statuses are ignored. Terminal statuses settle the top-up through the
    /// backend's idempotency gate, so redelivered and concurrently delivered notifications
    /// produce exactly one wallet credit.
    pub async fn process_payment_notification(
        &self,
        invoice_id: &str,
        new_status: TopUpStatus,
    ) -> Result<WebhookOutcome, WebhookError> {
        if !new_status.is_terminal() {
            debug!("💳️ Notification for invoice [{invoice_id}] is still {new_status}. Ignoring.");
            return Ok(WebhookOutcome::Ignored);
        }
        let outcome = match self.db.settle_top_up(invoice_id, new_status).await? {
            TopUpSettlement::Settled { top_up, credit: Some(credit) } => {
                info!("💳️ Invoice [{invoice_id}] paid. {} credited to user #{}", top_up.amount, top_up.user_id);
                WebhookOutcome::Credited { top_up, credit }
            },
            TopUpSettlement::Settled { top_up, credit: None } => {
                info!("💳️ Invoice [{invoice_id}] closed as {}", top_up.status);
                WebhookOutcome::Closed(top_up)
            },
            TopUpSettlement::AlreadySettled(top_up) => WebhookOutcome::AlreadySettled(top_up),
        };
        Ok(outcome)
    }

    /// Expires pending top-ups older than `older_than`. Called periodically by the background
    /// sweep so abandoned invoices do not linger as `Pending` forever.
    pub async fn expire_stale(&self, older_than: Duration) -> Result<Vec<TopUp>, TopUpError> {
        self.db.expire_stale_top_ups(older_than).await
    }

    pub async fn top_ups_for_user(&self, user_id: i64) -> Result<Vec<TopUp>, AccountApiError> {
        self.db.fetch_top_ups_for_user(user_id).await
    }
}

/// A process-unique correlation id passed to the gateway as the order number.
fn new_order_number(user_id: i64) -> String {
    let nonce = rand::thread_rng().gen::<u32>();
    format!("topup-{user_id}-{}-{nonce:08x}", chrono::Utc::now().timestamp())
}
