//! snmpstream - Fleet SNMP Interface Poller
//!
//! Polls a fleet of network devices listed in an inventory database on a
//! fixed cadence, walks their interface tables over SNMP, and streams
//! per-interface timestamped rows into a ClickHouse table.

pub mod config;
pub mod db;
pub mod models;
pub mod snmp;
pub mod backend;
pub mod store;

/// Application version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default SNMP agent port.
pub const DEFAULT_SNMP_PORT: u16 = 161;
