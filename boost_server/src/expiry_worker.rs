use boost_engine::{
    db_types::{Order, TopUp},
    OrderFlowApi,
    SqliteDatabase,
    StoreDatabase,
};
use chrono::Duration;
use log::*;
use tokio::task::JoinHandle;

/// Starts the background sweep. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// Each tick does two things:
/// * expires `Pending` top-ups older than `top_up_expiry`, so abandoned invoices do not linger,
/// * completes `Running` orders whose deadline has passed, stamping them as completed by "auto".
pub fn start_sweep_worker(db: SqliteDatabase, top_up_expiry: Duration, interval_secs: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        let orders = OrderFlowApi::new(db.clone());
        info!("🕰️ Background sweep started (every {interval_secs}s, top-ups expire after {}h)", top_up_expiry.num_hours());
        loop {
            timer.tick().await;
            trace!("🕰️ Running background sweep");
            match db.expire_stale_top_ups(top_up_expiry).await {
                Ok(expired) if expired.is_empty() => {},
                Ok(expired) => {
                    info!("🕰️ {} stale top-ups expired: {}", expired.len(), top_up_list(&expired));
                },
                Err(e) => {
                    error!("🕰️ Error expiring stale top-ups: {e}");
                },
            }
            match orders.auto_complete_overdue().await {
                Ok(completed) if completed.is_empty() => {},
                Ok(completed) => {
                    info!("🕰️ {} overdue orders completed: {}", completed.len(), order_list(&completed));
                },
                Err(e) => {
                    error!("🕰️ Error completing overdue orders: {e}");
                },
            }
        }
    })
}

fn top_up_list(top_ups: &[TopUp]) -> String {
    top_ups
        .iter()
        .map(|t| format!("[{}] invoice: {} user: {}", t.id, t.invoice_id, t.user_id))
        .collect::<Vec<String>>()
        .join(", ")
}

fn order_list(orders: &[Order]) -> String {
    orders
        .iter()
        .map(|o| format!("[{}] user: {} total: {}", o.id, o.user_id, o.total_price))
        .collect::<Vec<String>>()
        .join(", ")
}
