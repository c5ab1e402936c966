//! Sink writer pool.
//!
//! Writers drain DeviceMetrics from the bounded result queue, expand each
//! into per-interface rows and flush a batch insert whenever the row
//! buffer reaches the configured size. The remainder is flushed when the
//! queue closes or the root is cancelled. A failed flush drops the batch
//! and the writer keeps going: sink errors never poison the polling
//! pipeline.

use anyhow::Result;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::models::DeviceMetrics;
use crate::store::clickhouse::{expand_rows, InterfaceRecord, StoreClient};

/// Run one sink writer until the queue closes or shutdown fires.
pub async fn run_writer(
    writer_id: usize,
    store: StoreClient,
    queue: flume::Receiver<DeviceMetrics>,
    mut shutdown: watch::Receiver<bool>,
    flush_batch_size: usize,
) -> Result<()> {
    info!("Sink writer {} started", writer_id);
    let mut rows: Vec<InterfaceRecord> = Vec::with_capacity(flush_batch_size);

    loop {
        let metrics = tokio::select! {
            _ = shutdown.changed() => break,
            msg = queue.recv_async() => match msg {
                Ok(metrics) => metrics,
                // Queue closed: every queued result has been drained.
                Err(_) => break,
            }
        };

        debug!(
            "Writer {}: appending {} interfaces from {}",
            writer_id,
            metrics.interface_count(),
            metrics.sys_name
        );

        for record in expand_rows(&metrics) {
            rows.push(record);
            if rows.len() >= flush_batch_size {
                flush(&store, &mut rows, writer_id).await;
            }
        }
    }

    // One last flush of whatever is buffered.
    flush(&store, &mut rows, writer_id).await;
    info!("Sink writer {} stopped", writer_id);
    Ok(())
}

async fn flush(store: &StoreClient, rows: &mut Vec<InterfaceRecord>, writer_id: usize) {
    if rows.is_empty() {
        return;
    }

    match store.insert_rows(rows).await {
        Ok(()) => debug!("Writer {}: flushed {} rows", writer_id, rows.len()),
        Err(e) => error!(
            "Writer {}: batch insert failed, dropping {} rows: {}",
            writer_id,
            rows.len(),
            e
        ),
    }
    rows.clear();
}
