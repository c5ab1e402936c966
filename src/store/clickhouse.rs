//! ClickHouse client, schema and row materialization.
//!
//! One DeviceMetrics expands to one row per interface. Counters travel as
//! unbounded integers up to this boundary and are narrowed here to the
//! column widths: high-capacity counters to UInt64, error/discard
//! counters to Int64 (low 64 bits either way).

use std::net::{IpAddr, Ipv6Addr};

use anyhow::{Context, Result};
use clickhouse::{Client, Row};
use num_bigint::BigInt;
use serde::Serialize;
use tracing::info;

use crate::config::ClickhouseSettings;
use crate::models::{DeviceMetrics, InterfaceRow};

/// Handle on the interfaces table.
#[derive(Clone)]
pub struct StoreClient {
    client: Client,
    table: String,
}

impl StoreClient {
    /// Build a client from settings. The connection is lazy; the first
    /// query establishes it.
    pub fn new(settings: &ClickhouseSettings) -> Self {
        let client = Client::default()
            .with_url(settings.url())
            .with_database(&settings.db)
            .with_user(&settings.username)
            .with_password(&settings.password);

        Self {
            client,
            table: settings.interfaces_table_name.clone(),
        }
    }

    /// Create the interfaces table if it does not exist. Idempotent, safe
    /// to run on every startup.
    pub async fn init_schema(&self) -> Result<()> {
        let ddl = schema_ddl(&self.table);
        self.client
            .query(&ddl)
            .execute()
            .await
            .with_context(|| format!("Failed to initialize table {}", self.table))?;

        info!("Interfaces table {} ready", self.table);
        Ok(())
    }

    /// Send one batch of rows as a single insert.
    pub async fn insert_rows(&self, rows: &[InterfaceRecord]) -> Result<()> {
        let mut insert = self
            .client
            .insert(&self.table)
            .with_context(|| format!("Failed to prepare insert into {}", self.table))?;

        for row in rows {
            insert.write(row).await.context("Failed to append row")?;
        }
        insert.end().await.context("Batch insert failed")?;

        Ok(())
    }
}

/// DDL for the interfaces table.
pub fn schema_ddl(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            time Int64,
            sys_name String,
            hostname IPv6,
            sys_descr String,
            hardware String,
            os String,
            serial String,
            object_id String,
            uptime Int64,
            location String,
            lat Float64,
            lng Float64,
            neighbour String,
            if_alias String,
            if_name String,
            if_type Int32,
            mtu Int64,
            speed Int64,
            mac_address String,
            admin_status Bool,
            oper_status Bool,
            if_in_multicast_pkts UInt64,
            if_in_broadcast_pkts UInt64,
            if_out_multicast_pkts UInt64,
            if_out_broadcast_pkts UInt64,
            if_hcin_octets UInt64,
            if_hcin_ucast_pkts UInt64,
            if_hcin_multicast_pkts UInt64,
            if_hcin_broadcast_pkts UInt64,
            if_hcout_octets UInt64,
            if_hcout_ucast_pkts UInt64,
            if_hcout_multicast_pkts UInt64,
            if_hcout_broadcast_pkts UInt64,
            if_high_speed UInt64,
            if_counter_discontinuity_time UInt64,
            if_in_discards Int64,
            if_in_errors Int64,
            if_out_discards Int64,
            if_out_errors Int64
        )
        ENGINE = MergeTree
        ORDER BY tuple()"
    )
}

/// One row of the interfaces table, in insert order.
#[derive(Debug, Clone, PartialEq, Row, Serialize)]
pub struct InterfaceRecord {
    pub time: i64,
    pub sys_name: String,
    pub hostname: Ipv6Addr,
    pub sys_descr: String,
    pub hardware: String,
    pub os: String,
    pub serial: String,
    pub object_id: String,
    pub uptime: i64,
    pub location: String,
    pub lat: f64,
    pub lng: f64,
    pub neighbour: String,
    pub if_alias: String,
    pub if_name: String,
    pub if_type: i32,
    pub mtu: i64,
    pub speed: i64,
    pub mac_address: String,
    pub admin_status: bool,
    pub oper_status: bool,
    pub if_in_multicast_pkts: u64,
    pub if_in_broadcast_pkts: u64,
    pub if_out_multicast_pkts: u64,
    pub if_out_broadcast_pkts: u64,
    pub if_hcin_octets: u64,
    pub if_hcin_ucast_pkts: u64,
    pub if_hcin_multicast_pkts: u64,
    pub if_hcin_broadcast_pkts: u64,
    pub if_hcout_octets: u64,
    pub if_hcout_ucast_pkts: u64,
    pub if_hcout_multicast_pkts: u64,
    pub if_hcout_broadcast_pkts: u64,
    pub if_high_speed: u64,
    pub if_counter_discontinuity_time: u64,
    pub if_in_discards: i64,
    pub if_in_errors: i64,
    pub if_out_discards: i64,
    pub if_out_errors: i64,
}

/// Expand one poll result into per-interface rows. Counters the walk did
/// not return materialize as zero, so every registry counter column is
/// populated on every row.
pub fn expand_rows(metrics: &DeviceMetrics) -> Vec<InterfaceRecord> {
    let hostname = hostname_to_ipv6(&metrics.hostname);

    metrics
        .counters_map
        .values()
        .map(|iface| InterfaceRecord {
            time: metrics.time,
            sys_name: metrics.sys_name.clone(),
            hostname,
            sys_descr: metrics.sys_descr.clone(),
            hardware: metrics.hardware.clone(),
            os: metrics.os.clone(),
            serial: metrics.serial.clone(),
            object_id: metrics.object_id.clone(),
            uptime: metrics.uptime,
            location: metrics.location.clone(),
            lat: metrics.lat,
            lng: metrics.lng,
            neighbour: iface.neighbour.clone(),
            if_alias: iface.if_alias.clone(),
            if_name: iface.if_name.clone(),
            if_type: iface.if_type,
            mtu: iface.mtu,
            speed: iface.speed,
            mac_address: iface.mac_address.clone(),
            admin_status: iface.admin_status,
            oper_status: iface.oper_status,
            if_in_multicast_pkts: counter_u64(iface, "ifInMulticastPkts"),
            if_in_broadcast_pkts: counter_u64(iface, "ifInBroadcastPkts"),
            if_out_multicast_pkts: counter_u64(iface, "ifOutMulticastPkts"),
            if_out_broadcast_pkts: counter_u64(iface, "ifOutBroadcastPkts"),
            if_hcin_octets: counter_u64(iface, "ifHCInOctets"),
            if_hcin_ucast_pkts: counter_u64(iface, "ifHCInUcastPkts"),
            if_hcin_multicast_pkts: counter_u64(iface, "ifHCInMulticastPkts"),
            if_hcin_broadcast_pkts: counter_u64(iface, "ifHCInBroadcastPkts"),
            if_hcout_octets: counter_u64(iface, "ifHCOutOctets"),
            if_hcout_ucast_pkts: counter_u64(iface, "ifHCOutUcastPkts"),
            if_hcout_multicast_pkts: counter_u64(iface, "ifHCOutMulticastPkts"),
            if_hcout_broadcast_pkts: counter_u64(iface, "ifHCOutBroadcastPkts"),
            if_high_speed: counter_u64(iface, "ifHighSpeed"),
            if_counter_discontinuity_time: counter_u64(iface, "ifCounterDiscontinuityTime"),
            if_in_discards: counter_i64(iface, "ifInDiscards"),
            if_in_errors: counter_i64(iface, "ifInErrors"),
            if_out_discards: counter_i64(iface, "ifOutDiscards"),
            if_out_errors: counter_i64(iface, "ifOutErrors"),
        })
        .collect()
}

fn counter_u64(iface: &InterfaceRow, name: &str) -> u64 {
    iface.counters.get(name).map_or(0, big_to_u64)
}

fn counter_i64(iface: &InterfaceRow, name: &str) -> i64 {
    iface.counters.get(name).map_or(0, |v| big_to_u64(v) as i64)
}

/// Low 64 bits of an unbounded counter.
pub fn big_to_u64(value: &BigInt) -> u64 {
    let (_, digits) = value.to_u64_digits();
    digits.first().copied().unwrap_or(0)
}

/// Map the device hostname onto the IPv6 column: IPv6 literals pass
/// through, IPv4 literals map, anything else stores the unspecified
/// address.
pub fn hostname_to_ipv6(hostname: &str) -> Ipv6Addr {
    match hostname.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => v4.to_ipv6_mapped(),
        Ok(IpAddr::V6(v6)) => v6,
        Err(_) => Ipv6Addr::UNSPECIFIED,
    }
}
