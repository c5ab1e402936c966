//! Backend daemon - dispatcher, poller pool, sink writers and lifecycle.
//!
//! Everything runs under one supervisory task set: the first terminal
//! error from any task cancels the rest, and SIGINT/SIGTERM trigger a
//! graceful drain. Shutdown order: the dispatcher returns (closing the
//! job channel), pollers finish in-flight work and exit (closing the
//! result queue), writers flush buffered rows and exit.

pub mod dispatcher;
pub mod manager;

use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::signal;
use tokio::signal::unix::{signal as unix_signal, SignalKind};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::config::Settings;
use crate::db::DbPool;
use crate::models::{Device, DeviceMetrics};
use crate::store::{run_writer, StoreClient};

/// Start the poller backend and run until a signal or a fatal error.
pub async fn start_backend(settings: Arc<Settings>, db: DbPool, store: StoreClient) -> Result<()> {
    info!(
        "Starting backend: {} pollers, {} sink writers, tick every {}s",
        settings.workers_num,
        settings.clickhouse.concurrency,
        settings.polling_interval_seconds
    );

    // Rendezvous job channel: a send completes only when a poller is
    // ready, so saturated workers stretch the tick instead of queueing
    // unbounded work.
    let (job_tx, job_rx) = flume::bounded::<Device>(0);
    let (result_tx, result_rx) = flume::bounded::<DeviceMetrics>(settings.clickhouse.queue_length);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut tasks: JoinSet<Result<()>> = JoinSet::new();

    for writer_id in 0..settings.clickhouse.concurrency {
        tasks.spawn(run_writer(
            writer_id,
            store.clone(),
            result_rx.clone(),
            shutdown_rx.clone(),
            settings.clickhouse.flush_frequency,
        ));
    }

    for worker_id in 0..settings.workers_num {
        tasks.spawn(manager::run_worker(
            worker_id,
            job_rx.clone(),
            result_tx.clone(),
            shutdown_rx.clone(),
        ));
    }

    tasks.spawn(dispatcher::run_dispatcher(
        settings.clone(),
        db.pool.clone(),
        job_tx,
        shutdown_rx,
    ));

    // The tasks hold the only live channel ends now; dropping ours lets
    // the channels close as their owners exit.
    drop(job_rx);
    drop(result_tx);
    drop(result_rx);

    supervise(tasks, shutdown_tx).await
}

/// Wait on every task; a signal or the first task error cancels the rest.
async fn supervise(mut tasks: JoinSet<Result<()>>, shutdown_tx: watch::Sender<bool>) -> Result<()> {
    let mut sigterm = unix_signal(SignalKind::terminate())?;
    let mut first_error: Option<anyhow::Error> = None;

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Interrupt received, draining...");
                let _ = shutdown_tx.send(true);
            }
            _ = sigterm.recv() => {
                info!("Terminate received, draining...");
                let _ = shutdown_tx.send(true);
            }
            joined = tasks.join_next() => match joined {
                None => break,
                Some(Ok(Ok(()))) => {}
                Some(Ok(Err(e))) => {
                    error!("Background task failed: {:#}", e);
                    first_error.get_or_insert(e);
                    let _ = shutdown_tx.send(true);
                }
                Some(Err(join_err)) => {
                    error!("Background task panicked: {}", join_err);
                    first_error.get_or_insert(anyhow!(join_err));
                    let _ = shutdown_tx.send(true);
                }
            }
        }
    }

    info!("Backend stopped");
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
