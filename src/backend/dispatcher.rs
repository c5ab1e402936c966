//! Dispatcher - periodic fan-out of inventory devices to the poller pool.
//!
//! Each tick lists the fleet from the inventory and sends one job per
//! device into the rendezvous job channel. An inventory failure is
//! tick-level: it propagates out and cancels the whole backend. A tick
//! that overruns the interval is followed by exactly one immediate tick,
//! never a pile-up.

use anyhow::Result;
use sqlx::MySqlPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};
use tracing::info;

use crate::config::Settings;
use crate::db;
use crate::models::Device;

/// Run the dispatcher loop until shutdown.
pub async fn run_dispatcher(
    settings: Arc<Settings>,
    pool: MySqlPool,
    job_tx: flume::Sender<Device>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let period = Duration::from_secs(settings.polling_interval_seconds);
    info!("Dispatcher started, tick every {:?}", period);

    let mut next_tick = Instant::now() + period;
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                info!("Dispatcher stopping");
                return Ok(());
            }
            _ = sleep_until(next_tick) => {}
        }

        let devices = db::list_devices(&pool, settings.query.as_deref()).await?;
        info!("Tick: {} devices in inventory", devices.len());

        let windowed = apply_window(devices, settings.worker_offset, settings.worker_range);
        for device in windowed {
            tokio::select! {
                // A pending send is abandoned cleanly on cancellation.
                _ = shutdown.changed() => {
                    info!("Dispatcher stopping mid-tick");
                    return Ok(());
                }
                sent = job_tx.send_async(device) => {
                    if sent.is_err() {
                        // Pool is gone; nothing left to dispatch to.
                        return Ok(());
                    }
                }
            }
        }

        next_tick = (next_tick + period).max(Instant::now());
    }
}

/// Apply the optional `(offset, range)` fleet shard so multiple poller
/// instances can split one inventory.
pub fn apply_window(
    devices: Vec<Device>,
    offset: Option<usize>,
    range: Option<usize>,
) -> Vec<Device> {
    let skipped = devices.into_iter().skip(offset.unwrap_or(0));
    match range {
        Some(max) => skipped.take(max).collect(),
        None => skipped.collect(),
    }
}
