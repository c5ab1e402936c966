//! End-to-end pipeline tests.
//!
//! Exercise the job channel, worker pool, result queue and sink writers
//! over real tasks, without external SNMP agents or stores: devices with
//! broken credentials fail collection locally, and a sink pointed at a
//! closed port exercises the flush-failure tolerance.

use std::time::Duration;

use snmpstream::backend::manager::run_worker;
use snmpstream::config::ClickhouseSettings;
use snmpstream::models::{Device, DeviceMetrics, InterfaceRow};
use snmpstream::store::{run_writer, StoreClient};
use tokio::sync::watch;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

fn unreachable_store() -> StoreClient {
    StoreClient::new(&ClickhouseSettings {
        db: "telemetry".to_string(),
        username: "writer".to_string(),
        password: "writerpass".to_string(),
        addr: "127.0.0.1".to_string(),
        port: "1".to_string(),
        interfaces_table_name: "interfaces".to_string(),
        queue_length: 16,
        flush_frequency: 10,
        concurrency: 1,
    })
}

fn broken_device(device_id: i32) -> Device {
    // No hostname: session creation fails before any socket is opened.
    Device {
        device_id,
        hostname: None,
        sys_name: Some(format!("sw-{:03}", device_id)),
        community: Some("public".to_string()),
        auth_level: None,
        auth_name: None,
        auth_pass: None,
        auth_algo: None,
        crypto_pass: None,
        crypto_algo: None,
        snmp_ver: Some("v2c".to_string()),
        port: 161,
        transport: Some("udp".to_string()),
        sys_object_id: None,
        sys_descr: None,
        sys_contact: None,
        version: None,
        hardware: None,
        features: None,
        os: None,
        status: true,
        serial: None,
        location: None,
        lat: None,
        lng: None,
        uptime_seconds: None,
    }
}

fn metrics_with_interfaces(interfaces: i32) -> DeviceMetrics {
    let mut metrics = DeviceMetrics {
        time: 1_722_470_400,
        sys_name: "edge-sw-01".to_string(),
        hostname: "10.20.30.40".to_string(),
        ..DeviceMetrics::default()
    };
    for index in 1..=interfaces {
        metrics.counters_map.insert(index, InterfaceRow::default());
    }
    metrics
}

// ==================== Sink Writer Tests ====================

/// Empty inventory tick: queue closes without results, no batch is sent.
#[tokio::test]
async fn test_writer_drains_empty_queue() {
    let (result_tx, result_rx) = flume::bounded::<DeviceMetrics>(16);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let writer = tokio::spawn(run_writer(0, unreachable_store(), result_rx, shutdown_rx, 10));

    drop(result_tx);
    let outcome = timeout(WAIT, writer).await.expect("writer must exit");
    assert!(outcome.unwrap().is_ok());
}

/// Failed flushes are logged and dropped; the writer survives them and
/// still exits cleanly on queue close.
#[tokio::test]
async fn test_writer_survives_flush_failure() {
    let (result_tx, result_rx) = flume::bounded::<DeviceMetrics>(16);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let writer = tokio::spawn(run_writer(0, unreachable_store(), result_rx, shutdown_rx, 10));

    // 25 interfaces with a batch size of 10: two full batches mid-stream
    // plus the remainder on drain.
    result_tx
        .send_async(metrics_with_interfaces(25))
        .await
        .unwrap();
    drop(result_tx);

    let outcome = timeout(WAIT, writer).await.expect("writer must exit");
    assert!(outcome.unwrap().is_ok());
}

/// Root cancellation: the writer flushes what it has and exits.
#[tokio::test]
async fn test_writer_exits_on_shutdown() {
    let (_result_tx, result_rx) = flume::bounded::<DeviceMetrics>(16);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let writer = tokio::spawn(run_writer(0, unreachable_store(), result_rx, shutdown_rx, 10));

    shutdown_tx.send(true).unwrap();
    let outcome = timeout(WAIT, writer).await.expect("writer must exit");
    assert!(outcome.unwrap().is_ok());
}

// ==================== Worker Pool Tests ====================

/// A device that cannot produce a session is skipped; the worker keeps
/// consuming and exits when the job channel closes.
#[tokio::test]
async fn test_worker_skips_failing_devices() {
    let (job_tx, job_rx) = flume::bounded::<Device>(0);
    let (result_tx, result_rx) = flume::bounded::<DeviceMetrics>(16);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker = tokio::spawn(run_worker(0, job_rx, result_tx, shutdown_rx));

    for device_id in 0..3 {
        job_tx.send_async(broken_device(device_id)).await.unwrap();
    }
    drop(job_tx);

    let outcome = timeout(WAIT, worker).await.expect("worker must exit");
    assert!(outcome.unwrap().is_ok());
    // No partial results were emitted for the failed devices.
    assert!(result_rx.is_empty());
}

/// A worker blocked on an idle job channel observes cancellation.
#[tokio::test]
async fn test_worker_exits_on_shutdown() {
    let (_job_tx, job_rx) = flume::bounded::<Device>(0);
    let (result_tx, _result_rx) = flume::bounded::<DeviceMetrics>(16);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker = tokio::spawn(run_worker(0, job_rx, result_tx, shutdown_rx));

    shutdown_tx.send(true).unwrap();
    let outcome = timeout(WAIT, worker).await.expect("worker must exit");
    assert!(outcome.unwrap().is_ok());
}

// ==================== Drain Ordering Tests ====================

/// Closing the job channel drains the whole pipeline: workers exit, their
/// result senders drop, writers drain and exit.
#[tokio::test]
async fn test_pipeline_drains_in_order() {
    let (job_tx, job_rx) = flume::bounded::<Device>(0);
    let (result_tx, result_rx) = flume::bounded::<DeviceMetrics>(16);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut workers = Vec::new();
    for worker_id in 0..2 {
        workers.push(tokio::spawn(run_worker(
            worker_id,
            job_rx.clone(),
            result_tx.clone(),
            shutdown_rx.clone(),
        )));
    }
    let writer = tokio::spawn(run_writer(0, unreachable_store(), result_rx, shutdown_rx, 10));

    drop(job_rx);
    drop(result_tx);

    for device_id in 0..4 {
        job_tx.send_async(broken_device(device_id)).await.unwrap();
    }
    drop(job_tx);

    for worker in workers {
        let outcome = timeout(WAIT, worker).await.expect("worker must exit");
        assert!(outcome.unwrap().is_ok());
    }
    let outcome = timeout(WAIT, writer).await.expect("writer must exit");
    assert!(outcome.unwrap().is_ok());
}
