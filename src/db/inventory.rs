//! Inventory queries.

use anyhow::{Context, Result};
use sqlx::MySqlPool;
use tracing::error;

use crate::models::Device;

/// Standard device list query (LibreNMS schema).
pub const LIST_QUERY: &str = "SELECT device_id, hostname, sysName, community, \
     authlevel, authname, authpass, authalgo, cryptopass, cryptoalgo, \
     snmpver, port, transport, sysObjectID, sysDescr, sysContact, version, \
     hardware, features, os, status FROM devices";

/// List every pollable device.
///
/// `query_override` (env `QUERY`) replaces the standard query wholesale;
/// the selected columns must still map onto [`Device`].
pub async fn list_devices(
    pool: &MySqlPool,
    query_override: Option<&str>,
) -> Result<Vec<Device>> {
    let query = query_override.unwrap_or(LIST_QUERY);

    let devices = sqlx::query_as::<_, Device>(query)
        .fetch_all(pool)
        .await
        .inspect_err(|e| error!("Failed to list devices: {}", e))
        .context("Inventory device list query failed")?;

    Ok(devices)
}
