//! Interface metric OID registry.
//!
//! A fixed bidirectional mapping between symbolic metric names and OID
//! component paths. Covers the ifTable descriptor columns, the ifXTable
//! high-capacity counters, the low-capacity error/discard counters and the
//! LLDP remote system name. Read-only after first use.

use std::collections::HashMap;
use std::sync::OnceLock;

// ifTable (IF-MIB)
pub const IF_INDEX: &[u64] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 1];
pub const IF_DESCR: &[u64] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 2];
pub const IF_TYPE: &[u64] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 3];
pub const IF_MTU: &[u64] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 4];
pub const IF_SPEED: &[u64] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 5];
pub const IF_PHYS_ADDRESS: &[u64] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 6];
pub const IF_ADMIN_STATUS: &[u64] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 7];
pub const IF_OPER_STATUS: &[u64] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 8];
pub const IF_LAST_CHANGE: &[u64] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 9];
pub const IF_IN_DISCARDS: &[u64] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 13];
pub const IF_IN_ERRORS: &[u64] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 14];
pub const IF_OUT_DISCARDS: &[u64] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 19];
pub const IF_OUT_ERRORS: &[u64] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 20];

// ifXTable (IF-MIB)
pub const IF_IN_MULTICAST_PKTS: &[u64] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 2];
pub const IF_IN_BROADCAST_PKTS: &[u64] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 3];
pub const IF_OUT_MULTICAST_PKTS: &[u64] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 4];
pub const IF_OUT_BROADCAST_PKTS: &[u64] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 5];
pub const IF_HC_IN_OCTETS: &[u64] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 6];
pub const IF_HC_IN_UCAST_PKTS: &[u64] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 7];
pub const IF_HC_IN_MULTICAST_PKTS: &[u64] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 8];
pub const IF_HC_IN_BROADCAST_PKTS: &[u64] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 9];
pub const IF_HC_OUT_OCTETS: &[u64] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 10];
pub const IF_HC_OUT_UCAST_PKTS: &[u64] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 11];
pub const IF_HC_OUT_MULTICAST_PKTS: &[u64] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 12];
pub const IF_HC_OUT_BROADCAST_PKTS: &[u64] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 13];
pub const IF_HIGH_SPEED: &[u64] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 15];
pub const IF_COUNTER_DISCONTINUITY_TIME: &[u64] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 19];
pub const IF_ALIAS: &[u64] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 18];

// LLDP MIB (LLDP-MIB). Instance OIDs extend past the base with
// timeMark.localPortNum.index, so lookups go through the prefix rule.
pub const LLDP_REM_SYS_NAME: &[u64] = &[1, 0, 8802, 1, 1, 2, 1, 4, 1, 1, 9];

/// The authoritative name <-> OID table.
pub const REGISTRY: &[(&str, &[u64])] = &[
    ("ifIndex", IF_INDEX),
    ("ifDescr", IF_DESCR),
    ("ifType", IF_TYPE),
    ("ifMtu", IF_MTU),
    ("ifSpeed", IF_SPEED),
    ("ifPhysAddress", IF_PHYS_ADDRESS),
    ("ifAdminStatus", IF_ADMIN_STATUS),
    ("ifOperStatus", IF_OPER_STATUS),
    ("ifLastChange", IF_LAST_CHANGE),
    ("ifAlias", IF_ALIAS),
    ("ifInMulticastPkts", IF_IN_MULTICAST_PKTS),
    ("ifInBroadcastPkts", IF_IN_BROADCAST_PKTS),
    ("ifOutMulticastPkts", IF_OUT_MULTICAST_PKTS),
    ("ifOutBroadcastPkts", IF_OUT_BROADCAST_PKTS),
    ("ifHCInOctets", IF_HC_IN_OCTETS),
    ("ifHCInUcastPkts", IF_HC_IN_UCAST_PKTS),
    ("ifHCInMulticastPkts", IF_HC_IN_MULTICAST_PKTS),
    ("ifHCInBroadcastPkts", IF_HC_IN_BROADCAST_PKTS),
    ("ifHCOutOctets", IF_HC_OUT_OCTETS),
    ("ifHCOutUcastPkts", IF_HC_OUT_UCAST_PKTS),
    ("ifHCOutMulticastPkts", IF_HC_OUT_MULTICAST_PKTS),
    ("ifHCOutBroadcastPkts", IF_HC_OUT_BROADCAST_PKTS),
    ("ifHighSpeed", IF_HIGH_SPEED),
    ("ifCounterDiscontinuityTime", IF_COUNTER_DISCONTINUITY_TIME),
    ("ifInDiscards", IF_IN_DISCARDS),
    ("ifInErrors", IF_IN_ERRORS),
    ("ifOutDiscards", IF_OUT_DISCARDS),
    ("ifOutErrors", IF_OUT_ERRORS),
    ("lldpRemSysName", LLDP_REM_SYS_NAME),
];

/// Counter columns materialized on every emitted row. High-capacity names
/// first (narrowed unsigned at the sink), error/discard last (signed).
pub const HC_COUNTER_NAMES: &[&str] = &[
    "ifInMulticastPkts",
    "ifInBroadcastPkts",
    "ifOutMulticastPkts",
    "ifOutBroadcastPkts",
    "ifHCInOctets",
    "ifHCInUcastPkts",
    "ifHCInMulticastPkts",
    "ifHCInBroadcastPkts",
    "ifHCOutOctets",
    "ifHCOutUcastPkts",
    "ifHCOutMulticastPkts",
    "ifHCOutBroadcastPkts",
    "ifHighSpeed",
    "ifCounterDiscontinuityTime",
];

pub const ERROR_COUNTER_NAMES: &[&str] = &[
    "ifInDiscards",
    "ifInErrors",
    "ifOutDiscards",
    "ifOutErrors",
];

/// Constant-time name <-> OID lookups plus the longest-prefix resolution
/// used for multi-component instance suffixes (LLDP).
pub struct OidRegistry {
    by_name: HashMap<&'static str, &'static [u64]>,
    by_oid: HashMap<&'static [u64], &'static str>,
}

impl OidRegistry {
    fn build() -> Self {
        let mut by_name = HashMap::with_capacity(REGISTRY.len());
        let mut by_oid = HashMap::with_capacity(REGISTRY.len());
        for (name, oid) in REGISTRY {
            by_name.insert(*name, *oid);
            by_oid.insert(*oid, *name);
        }
        Self { by_name, by_oid }
    }

    /// OID components for a symbolic name.
    pub fn oid_of(&self, name: &str) -> Option<&'static [u64]> {
        self.by_name.get(name).copied()
    }

    /// Exact reverse lookup.
    pub fn name_of(&self, oid: &[u64]) -> Option<&'static str> {
        self.by_oid.get(oid).copied()
    }

    /// Resolve an instance OID from a walk to `(name, ifIndex)`.
    ///
    /// Strips trailing components until the remainder is a registered OID;
    /// the first component after the match is the interface index. Plain
    /// table columns resolve in one strip (`base.ifIndex`); LLDP remote
    /// names resolve through their longer `base.timeMark.port.index`
    /// suffix, where the port is the interface index.
    pub fn resolve(&self, oid: &[u64]) -> Option<(&'static str, i32)> {
        for prefix_len in (1..oid.len()).rev() {
            if let Some(name) = self.by_oid.get(&oid[..prefix_len]) {
                let index = oid[prefix_len];
                return Some((name, index as i32));
            }
        }
        None
    }

    /// All walkable OIDs except `ifIndex` (which has its own discovery
    /// stage).
    pub fn walk_targets(&self) -> impl Iterator<Item = (&'static str, &'static [u64])> + '_ {
        REGISTRY
            .iter()
            .filter(|(name, _)| *name != "ifIndex")
            .copied()
    }
}

/// The process-wide registry instance.
pub fn registry() -> &'static OidRegistry {
    static REGISTRY_CELL: OnceLock<OidRegistry> = OnceLock::new();
    REGISTRY_CELL.get_or_init(OidRegistry::build)
}

/// Dotted rendering of OID components.
pub fn dotted(oid: &[u64]) -> String {
    oid.iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(".")
}
