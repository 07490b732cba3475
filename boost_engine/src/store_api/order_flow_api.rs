use std::fmt::Debug;

use chrono::Utc;
use log::*;

use crate::{
    db_types::{NewOrder, Order},
    pricing,
    store_api::order_objects::NewOrderRequest,
    traits::{AccountApiError, OrderError, StoreDatabase},
};

/// Maximum value for the interval between boost deliveries, in minutes.
const MAX_INTERVAL: i64 = 60;

/// `OrderFlowApi` is the primary API for placing and fulfilling orders.
///
/// Placement takes an untrusted [`NewOrderRequest`], validates it against the catalog, prices it
/// server-side and hands the backend a fully priced order to pay for and persist atomically.
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrderFlowApi<B>
where B: StoreDatabase
{
    /// Places a new order on behalf of `user_id`.
    ///
    /// The request is validated in order:
    /// 1. The service option must exist and belong to the requested service.
    /// 2. If the option requires an interval, the request must carry one in `1..=60`. If it does
    ///    not, any supplied interval is dropped rather than stored.
    /// 3. The billing period defaults to the option's period when the request omits one.
    /// 4. The order is priced from the option's unit price and the best applicable discount
    ///    (the larger of the option's discount and the user's override).
    ///
    /// The backend then debits the wallet, persists the order and appends the ledger entry in a
    /// single transaction. On insufficient funds nothing is recorded.
    pub async fn place_order(&self, user_id: i64, request: NewOrderRequest) -> Result<Order, OrderError> {
        let option = self
            .db
            .fetch_service_option(request.service_option_id)
            .await?
            .filter(|o| o.service_id == request.service_id)
            .ok_or(OrderError::InvalidServiceOption)?;
        let interval = if option.is_interval_required {
            match request.interval {
                Some(i) if (1..=MAX_INTERVAL).contains(&i) => Some(i),
                _ => return Err(OrderError::IntervalRequired),
            }
        } else {
            None
        };
        let period = request.period.or(option.period);
        let user_discount = self.db.fetch_user_discount(user_id, option.id).await?;
        let (unit_price, total_price) =
            pricing::quote(option.unit_price, option.discount, user_discount, request.quantity)?;
        trace!(
            "🔄️📦️ Order request from user #{user_id} for option #{} priced at {unit_price} x {} = {total_price}",
            option.id,
            request.quantity
        );
        let order = NewOrder {
            user_id,
            service_id: option.service_id,
            service_option_id: option.id,
            custom_data: request.custom_data,
            quantity: request.quantity,
            unit_price,
            total_price,
            currency: option.currency.clone(),
            period,
            interval,
            notes: request.notes,
        };
        let order = self.db.create_paid_order(order).await?;
        debug!("🔄️📦️ Order #{} placed by user #{user_id} for {total_price}", order.id);
        Ok(order)
    }

    /// Starts fulfilment of a pending order. If the order carries a billing period, the
    /// completion deadline is stamped as now + one period; the auto-completion sweep picks the
    /// order up once the deadline passes.
    pub async fn start_order(&self, order_id: i64) -> Result<Order, OrderError> {
        let order = self.db.fetch_order(order_id).await?.ok_or(OrderError::OrderNotFound(order_id))?;
        let deadline = order.period.map(|p| Utc::now() + p.duration());
        self.db.start_order(order_id, deadline).await
    }

    /// Marks an order as completed by the named admin.
    pub async fn complete_order(&self, order_id: i64, completed_by: &str) -> Result<Order, OrderError> {
        self.db.complete_order(order_id, completed_by).await
    }

    /// Completes every running order whose deadline has passed. Called periodically by the
    /// background sweep.
    pub async fn auto_complete_overdue(&self) -> Result<Vec<Order>, OrderError> {
        self.db.complete_overdue_orders("auto").await
    }

    pub async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, AccountApiError> {
        self.db.fetch_order(order_id).await
    }

    /// All orders belonging to the user, oldest first.
    pub async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AccountApiError> {
        self.db.fetch_orders_for_user(user_id).await
    }
}
