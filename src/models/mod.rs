//! Data models for the polling pipeline.
//!
//! `Device` maps to the inventory `devices` table via SQLx; `DeviceMetrics`
//! and `InterfaceRow` are the in-process shapes that flow from the SNMP
//! collector to the ClickHouse sink.

pub mod device;
pub mod metrics;

pub use device::Device;
pub use metrics::{DeviceMetrics, InterfaceRow};
