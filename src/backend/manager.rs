//! Poller worker pool - runs the collection pipeline per dispatched job.

use anyhow::Result;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::models::{Device, DeviceMetrics};
use crate::snmp;

/// Run one poller worker: receive jobs, collect, hand results to the
/// sink. A failed device is logged and skipped for the tick; the worker
/// moves on. Exits when the job channel closes or shutdown fires.
pub async fn run_worker(
    worker_id: usize,
    job_rx: flume::Receiver<Device>,
    sink_tx: flume::Sender<DeviceMetrics>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    info!("Poller worker {} started", worker_id);

    loop {
        let device = tokio::select! {
            _ = shutdown.changed() => break,
            job = job_rx.recv_async() => match job {
                Ok(device) => device,
                Err(_) => break,
            }
        };

        let name = device.display_name();
        debug!("Worker {}: polling {}", worker_id, name);

        match snmp::collect(&device).await {
            Ok(metrics) => {
                let interfaces = metrics.interface_count();
                tokio::select! {
                    _ = shutdown.changed() => break,
                    sent = sink_tx.send_async(metrics) => {
                        if sent.is_err() {
                            break;
                        }
                        debug!(
                            "Worker {}: enqueued {} interfaces for {}",
                            worker_id, interfaces, name
                        );
                    }
                }
            }
            Err(e) => warn!("Worker {}: poll of {} failed: {}", worker_id, name, e),
        }
    }

    info!("Poller worker {} stopped", worker_id);
    Ok(())
}
