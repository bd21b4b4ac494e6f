use chrono::Duration;
use log::*;
use tokio::task::JoinHandle;
use usdc_payment_engine::{events::EventProducers, DepositConfig, OrderFlowApi, SqliteDatabase};

/// Starts the payout recovery worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// Every `interval`, orders that have been sitting in `paid` for at least `interval` get their `OrderPaid` event
/// published again, which hands them back to the payout handler. An order that is already being converted cannot be
/// converted twice, so a spurious event is harmless.
pub fn start_payout_recovery_worker(
    db: SqliteDatabase,
    deposit: DepositConfig,
    producers: EventProducers,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = interval.to_std().unwrap_or(std::time::Duration::from_secs(300));
        let mut timer = tokio::time::interval(period);
        let api = OrderFlowApi::new(db, deposit, producers);
        info!("💸️ Payout recovery worker started. Sweeping every {}s", period.as_secs());
        loop {
            timer.tick().await;
            trace!("💸️ Looking for paid orders that were never converted");
            match api.republish_stale_paid_orders(interval).await {
                Ok(0) => {},
                Ok(n) => warn!("💸️ {n} paid orders had not been converted. Their payouts have been dispatched again."),
                Err(e) => error!("💸️ Error running payout recovery job: {e}"),
            }
        }
    })
}
