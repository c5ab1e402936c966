//! Device model - one polling target from the inventory database.
//!
//! Maps to the `devices` table (LibreNMS schema). Nullable text columns
//! come through as `Option<String>`; fields outside the standard list
//! query are `#[sqlx(default)]` so a narrower `QUERY` override still maps.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A network device polled for interface metrics.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Device {
    /// Primary key in the inventory.
    pub device_id: i32,
    /// Address the SNMP agent is reached at (IP literal or DNS name).
    pub hostname: Option<String>,
    /// sysName as recorded by the inventory.
    #[sqlx(rename = "sysName")]
    pub sys_name: Option<String>,
    /// SNMPv1/v2c community string.
    pub community: Option<String>,
    /// SNMPv3 security level: noAuthNoPriv, authNoPriv or authPriv.
    #[sqlx(rename = "authlevel")]
    pub auth_level: Option<String>,
    /// SNMPv3 user name.
    #[sqlx(rename = "authname")]
    pub auth_name: Option<String>,
    /// SNMPv3 authentication passphrase.
    #[sqlx(rename = "authpass")]
    pub auth_pass: Option<String>,
    /// SNMPv3 authentication algorithm (SHA default, MD5 accepted).
    #[sqlx(rename = "authalgo")]
    pub auth_algo: Option<String>,
    /// SNMPv3 privacy passphrase.
    #[sqlx(rename = "cryptopass")]
    pub crypto_pass: Option<String>,
    /// SNMPv3 privacy algorithm (AES default, DES accepted).
    #[sqlx(rename = "cryptoalgo")]
    pub crypto_algo: Option<String>,
    /// SNMP version: "1", "v2c" or "v3".
    #[sqlx(rename = "snmpver")]
    pub snmp_ver: Option<String>,
    /// Agent port; 0 means the default 161.
    pub port: i32,
    /// "udp" or "tcp".
    pub transport: Option<String>,
    /// sysObjectID from discovery.
    #[sqlx(rename = "sysObjectID")]
    pub sys_object_id: Option<String>,
    /// sysDescr from discovery.
    #[sqlx(rename = "sysDescr")]
    pub sys_descr: Option<String>,
    /// sysContact from discovery.
    #[sqlx(rename = "sysContact")]
    pub sys_contact: Option<String>,
    /// OS version string.
    pub version: Option<String>,
    /// Hardware model.
    pub hardware: Option<String>,
    /// Feature set string.
    pub features: Option<String>,
    /// Operating system.
    pub os: Option<String>,
    /// Whether the inventory considers the device up.
    pub status: bool,

    // Descriptive columns outside the standard list query; a QUERY
    // override may populate them.
    #[sqlx(default)]
    pub serial: Option<String>,
    #[sqlx(default)]
    pub location: Option<String>,
    #[sqlx(default)]
    pub lat: Option<f64>,
    #[sqlx(default)]
    pub lng: Option<f64>,
    #[sqlx(default)]
    pub uptime_seconds: Option<i64>,
}

impl Device {
    /// Agent port with the SNMP default applied.
    pub fn agent_port(&self) -> u16 {
        if self.port <= 0 {
            crate::DEFAULT_SNMP_PORT
        } else {
            self.port as u16
        }
    }

    /// Display name - prefers sysName, falls back to hostname, then id.
    pub fn display_name(&self) -> String {
        self.sys_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.hostname.as_deref().filter(|s| !s.is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| format!("device#{}", self.device_id))
    }
}
