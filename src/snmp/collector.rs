//! The per-device collection pipeline.
//!
//! A fixed, ordered list of stages is applied to an in-progress
//! [`DeviceMetrics`] record: discover interface indexes, enrich with the
//! device's descriptive fields, walk the registry OIDs, decode the walk
//! into typed per-interface fields. Any stage error abandons the device
//! for this tick; the session is released on every exit path. Partial
//! records are never emitted.

use chrono::Utc;
use tracing::debug;

use crate::models::{Device, DeviceMetrics, InterfaceRow};
use crate::snmp::client::{CollectError, SnmpSession, SnmpValue, WalkedBind};
use crate::snmp::oids::{self, registry};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Walk ifIndex and seed one empty row per interface.
    Indexes,
    /// Copy the device's descriptive fields into the record.
    Enrich,
    /// Walk every registry OID and stamp the observation time.
    Counters,
    /// Decode the walked varbinds into the seeded rows.
    Decode,
}

/// The canonical pipeline.
pub const PIPELINE: &[Stage] = &[Stage::Indexes, Stage::Enrich, Stage::Counters, Stage::Decode];

/// Poll one device: open a session, run the pipeline, return the completed
/// record. The UDP socket is released whether the pipeline succeeds or
/// not.
pub async fn collect(device: &Device) -> Result<DeviceMetrics, CollectError> {
    let session = SnmpSession::open(device).await?;
    let mut driver = Driver {
        session,
        walked: Vec::new(),
    };
    let mut metrics = DeviceMetrics::default();

    let outcome = driver.run(device, &mut metrics).await;
    // Dropping the driver closes the session.
    drop(driver);
    outcome?;

    Ok(metrics)
}

struct Driver {
    session: SnmpSession,
    walked: Vec<WalkedBind>,
}

impl Driver {
    async fn run(
        &mut self,
        device: &Device,
        metrics: &mut DeviceMetrics,
    ) -> Result<(), CollectError> {
        for stage in PIPELINE {
            self.apply(*stage, device, metrics).await?;
        }
        Ok(())
    }

    async fn apply(
        &mut self,
        stage: Stage,
        device: &Device,
        metrics: &mut DeviceMetrics,
    ) -> Result<(), CollectError> {
        match stage {
            Stage::Indexes => self.discover_indexes(metrics).await,
            Stage::Enrich => {
                enrich_from_device(metrics, device);
                Ok(())
            }
            Stage::Counters => self.walk_counters(metrics).await,
            Stage::Decode => {
                decode_walk(metrics, &self.walked);
                Ok(())
            }
        }
    }

    async fn discover_indexes(&mut self, metrics: &mut DeviceMetrics) -> Result<(), CollectError> {
        let binds = self.session.bulk_walk(oids::IF_INDEX).await?;

        for (_oid, value) in &binds {
            let &SnmpValue::Integer(index) = value else {
                return Err(CollectError::InterfaceIndexNotInteger);
            };
            metrics
                .counters_map
                .insert(index as i32, InterfaceRow::default());
        }

        debug!("Got {} interface indexes", metrics.counters_map.len());
        Ok(())
    }

    async fn walk_counters(&mut self, metrics: &mut DeviceMetrics) -> Result<(), CollectError> {
        for (_name, oid) in registry().walk_targets() {
            let binds = self.session.bulk_walk(oid).await?;
            self.walked.extend(binds);
        }
        // The observation timestamp belongs to the walk, not to the
        // enqueue that happens later.
        metrics.time = Utc::now().timestamp();

        debug!("Walked {} varbinds", self.walked.len());
        Ok(())
    }
}

/// Copy descriptive inventory fields onto the record. Absent fields stay
/// at their defaults rather than being invented.
fn enrich_from_device(metrics: &mut DeviceMetrics, device: &Device) {
    if let Some(hostname) = &device.hostname {
        metrics.hostname = hostname.clone();
    }
    if let Some(sys_name) = &device.sys_name {
        metrics.sys_name = sys_name.clone();
    }
    if let Some(sys_descr) = &device.sys_descr {
        metrics.sys_descr = sys_descr.clone();
    }
    if let Some(object_id) = &device.sys_object_id {
        metrics.object_id = object_id.clone();
    }
    if let Some(hardware) = &device.hardware {
        metrics.hardware = hardware.clone();
    }
    if let Some(os) = &device.os {
        metrics.os = os.clone();
    }
    if let Some(serial) = &device.serial {
        metrics.serial = serial.clone();
    }
    if let Some(location) = &device.location {
        metrics.location = location.clone();
    }
    if let Some(uptime) = device.uptime_seconds {
        metrics.uptime = uptime;
    }
    if let (Some(lat), Some(lng)) = (device.lat, device.lng) {
        metrics.lat = lat;
        metrics.lng = lng;
    }
}

/// Decode walked varbinds into the seeded interface rows.
///
/// The instance OID resolves to `(name, ifIndex)` through the registry's
/// prefix rule; varbinds for indexes the ifIndex walk did not report are
/// dropped, so the key set stays exactly the discovered one.
pub fn decode_walk(metrics: &mut DeviceMetrics, walked: &[WalkedBind]) {
    for (oid, value) in walked {
        let Some((name, index)) = registry().resolve(oid) else {
            continue;
        };
        let Some(row) = metrics.counters_map.get_mut(&index) else {
            continue;
        };

        match name {
            "ifPhysAddress" => {
                row.mac_address = match value {
                    SnmpValue::OctetString(bytes) => format_mac(bytes),
                    other => other.render(),
                };
            }
            "ifAlias" => row.if_alias = decode_string(value),
            "ifDescr" => row.if_name = decode_string(value),
            "lldpRemSysName" => row.neighbour = decode_string(value),
            "ifAdminStatus" => row.admin_status = value.as_int() == 1,
            "ifOperStatus" => row.oper_status = value.as_int() == 1,
            "ifSpeed" => row.speed = value.as_int(),
            "ifMtu" => row.mtu = value.as_int(),
            "ifType" => row.if_type = value.as_int() as i32,
            "ifLastChange" => row.last_change = value.as_int(),
            _ => {
                row.counters.insert(name.to_string(), value.as_big_int());
            }
        }
    }
}

/// Render a physical address as lowercase colon-separated hex pairs,
/// two digits per byte.
pub fn format_mac(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(":")
}

fn decode_string(value: &SnmpValue) -> String {
    match value {
        SnmpValue::OctetString(bytes) => String::from_utf8_lossy(bytes).to_string(),
        other => other.render(),
    }
}
