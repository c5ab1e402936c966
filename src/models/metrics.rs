//! Interface metrics records produced by one poll of one device.
//!
//! `counters_map` is keyed by ifIndex. Counter values are unbounded
//! integers: 64-bit SNMP counters can exceed a signed 64-bit range, so
//! narrowing to column widths happens only at the sink boundary.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One observation of a single interface on one device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceRow {
    /// ifAlias (1.3.6.1.2.1.31.1.1.1.18)
    pub if_alias: String,
    /// ifDescr (1.3.6.1.2.1.2.2.1.2)
    pub if_name: String,
    /// ifType (1.3.6.1.2.1.2.2.1.3)
    pub if_type: i32,
    /// ifMtu (1.3.6.1.2.1.2.2.1.4)
    pub mtu: i64,
    /// ifSpeed (1.3.6.1.2.1.2.2.1.5)
    pub speed: i64,
    /// ifPhysAddress (1.3.6.1.2.1.2.2.1.6), formatted aa:bb:cc:dd:ee:ff
    pub mac_address: String,
    /// ifAdminStatus == up (1.3.6.1.2.1.2.2.1.7)
    pub admin_status: bool,
    /// ifOperStatus == up (1.3.6.1.2.1.2.2.1.8)
    pub oper_status: bool,
    /// ifLastChange timeticks (1.3.6.1.2.1.2.2.1.9)
    pub last_change: i64,
    /// lldpRemSysName of the attached neighbour, when advertised.
    pub neighbour: String,

    /// Remaining walked columns, keyed by registry name.
    pub counters: BTreeMap<String, BigInt>,
}

/// The aggregate produced by one poll of one device: descriptive fields
/// copied from the inventory record plus one `InterfaceRow` per observed
/// interface index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceMetrics {
    /// Epoch seconds, assigned immediately after the counter walk.
    pub time: i64,
    pub sys_name: String,
    pub hostname: String,
    pub sys_descr: String,
    pub hardware: String,
    pub os: String,
    pub serial: String,
    pub object_id: String,
    pub uptime: i64,
    pub location: String,
    pub lat: f64,
    pub lng: f64,

    /// ifIndex -> interface observation. Seeded from the ifIndex walk, so
    /// every observed index has an entry even when later walks returned
    /// nothing for it.
    pub counters_map: BTreeMap<i32, InterfaceRow>,
}

impl DeviceMetrics {
    /// Number of interfaces observed in the ifIndex walk.
    pub fn interface_count(&self) -> usize {
        self.counters_map.len()
    }
}
