//! SNMP collection for device polling.
//!
//! Wraps the `snmp2` crate with session construction from inventory
//! credentials and subtree walks, and drives the fixed stage pipeline that
//! turns walk results into a typed [`DeviceMetrics`] record.
//!
//! [`DeviceMetrics`]: crate::models::DeviceMetrics

pub mod client;
pub mod collector;
pub mod oids;

pub use client::{CollectError, SnmpSession, SnmpValue};
pub use collector::collect;
pub use oids::{registry, OidRegistry};
