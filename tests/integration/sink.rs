//! Integration tests for row expansion, narrowing and the schema shape.

use num_bigint::BigInt;
use snmpstream::models::{DeviceMetrics, InterfaceRow};
use snmpstream::store::clickhouse::{
    big_to_u64, expand_rows, hostname_to_ipv6, schema_ddl,
};

fn polled_metrics(interfaces: i32) -> DeviceMetrics {
    let mut metrics = DeviceMetrics {
        time: 1_722_470_400,
        sys_name: "edge-sw-01".to_string(),
        hostname: "10.20.30.40".to_string(),
        sys_descr: "Cisco IOS Software".to_string(),
        hardware: "C3750".to_string(),
        os: "ios".to_string(),
        serial: "FDO1234X0AB".to_string(),
        object_id: "1.3.6.1.4.1.9.1.516".to_string(),
        uptime: 86_400,
        location: "DC1, Row B".to_string(),
        lat: 52.37,
        lng: 4.89,
        ..DeviceMetrics::default()
    };
    for index in 1..=interfaces {
        metrics.counters_map.insert(index, InterfaceRow::default());
    }
    metrics
}

// ==================== Row Expansion Tests ====================

#[test]
fn test_expand_one_row_per_interface() {
    let rows = expand_rows(&polled_metrics(25));
    assert_eq!(rows.len(), 25);
}

#[test]
fn test_expand_empty_metrics() {
    let rows = expand_rows(&polled_metrics(0));
    assert!(rows.is_empty());
}

#[test]
fn test_expand_copies_device_fields_onto_every_row() {
    let rows = expand_rows(&polled_metrics(3));
    for row in &rows {
        assert_eq!(row.time, 1_722_470_400);
        assert_eq!(row.sys_name, "edge-sw-01");
        assert_eq!(row.sys_descr, "Cisco IOS Software");
        assert_eq!(row.hardware, "C3750");
        assert_eq!(row.serial, "FDO1234X0AB");
        assert_eq!(row.object_id, "1.3.6.1.4.1.9.1.516");
        assert_eq!(row.uptime, 86_400);
        assert_eq!(row.lat, 52.37);
        assert_eq!(row.lng, 4.89);
    }
}

#[test]
fn test_expand_materializes_absent_counters_as_zero() {
    // Rows seeded by the ifIndex walk but never reached by a counter
    // walk still carry every counter column.
    let rows = expand_rows(&polled_metrics(1));
    let row = &rows[0];
    assert_eq!(row.if_hcin_octets, 0);
    assert_eq!(row.if_hcout_octets, 0);
    assert_eq!(row.if_high_speed, 0);
    assert_eq!(row.if_in_discards, 0);
    assert_eq!(row.if_out_errors, 0);
}

#[test]
fn test_expand_narrows_hc_counters_unsigned() {
    let mut metrics = polled_metrics(1);
    let row = metrics.counters_map.get_mut(&1).unwrap();
    row.counters
        .insert("ifHCInOctets".to_string(), BigInt::from(u64::MAX));
    row.counters.insert("ifHCOutOctets".to_string(), BigInt::from(12_345));

    let rows = expand_rows(&metrics);
    assert_eq!(rows[0].if_hcin_octets, u64::MAX);
    assert_eq!(rows[0].if_hcout_octets, 12_345);
}

#[test]
fn test_expand_narrows_error_counters_signed() {
    let mut metrics = polled_metrics(1);
    let row = metrics.counters_map.get_mut(&1).unwrap();
    row.counters.insert("ifInErrors".to_string(), BigInt::from(17));
    row.counters.insert("ifOutDiscards".to_string(), BigInt::from(3));

    let rows = expand_rows(&metrics);
    assert_eq!(rows[0].if_in_errors, 17);
    assert_eq!(rows[0].if_out_discards, 3);
}

#[test]
fn test_expand_copies_interface_fields() {
    let mut metrics = polled_metrics(2);
    {
        let row = metrics.counters_map.get_mut(&2).unwrap();
        row.if_name = "Gi0/1".to_string();
        row.if_alias = "uplink".to_string();
        row.if_type = 6;
        row.mtu = 1500;
        row.speed = 1_000_000_000;
        row.mac_address = "00:1b:21:00:00:01".to_string();
        row.admin_status = true;
        row.oper_status = true;
        row.neighbour = "core-sw-02".to_string();
    }

    let rows = expand_rows(&metrics);
    // BTreeMap order: index 1 first, index 2 second.
    assert_eq!(rows[1].if_name, "Gi0/1");
    assert_eq!(rows[1].if_alias, "uplink");
    assert_eq!(rows[1].if_type, 6);
    assert_eq!(rows[1].mtu, 1500);
    assert_eq!(rows[1].mac_address, "00:1b:21:00:00:01");
    assert!(rows[1].admin_status);
    assert!(rows[1].oper_status);
    assert_eq!(rows[1].neighbour, "core-sw-02");
    assert_eq!(rows[0].if_name, "");
}

// ==================== Narrowing Tests ====================

#[test]
fn test_big_to_u64_in_range() {
    assert_eq!(big_to_u64(&BigInt::from(0)), 0);
    assert_eq!(big_to_u64(&BigInt::from(1)), 1);
    assert_eq!(big_to_u64(&BigInt::from(u64::MAX)), u64::MAX);
}

#[test]
fn test_big_to_u64_truncates_to_low_64_bits() {
    let oversized = BigInt::from(u64::MAX) + 6;
    assert_eq!(big_to_u64(&oversized), 5);
}

// ==================== Hostname Mapping Tests ====================

#[test]
fn test_hostname_ipv4_maps() {
    let mapped = hostname_to_ipv6("10.20.30.40");
    assert_eq!(mapped, "::ffff:10.20.30.40".parse::<std::net::Ipv6Addr>().unwrap());
}

#[test]
fn test_hostname_ipv6_passthrough() {
    let addr = hostname_to_ipv6("2001:db8::1");
    assert_eq!(addr, "2001:db8::1".parse::<std::net::Ipv6Addr>().unwrap());
}

#[test]
fn test_hostname_dns_name_is_unspecified() {
    assert_eq!(hostname_to_ipv6("edge-sw-01.example.net"), std::net::Ipv6Addr::UNSPECIFIED);
}

// ==================== Schema Tests ====================

#[test]
fn test_schema_is_idempotent_create() {
    let ddl = schema_ddl("interfaces");
    assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS interfaces"));
    assert!(ddl.contains("ENGINE = MergeTree"));
    assert!(ddl.contains("ORDER BY tuple()"));
}

#[test]
fn test_schema_column_order_matches_insert_order() {
    let ddl = schema_ddl("interfaces");
    let columns = [
        "time Int64",
        "sys_name String",
        "hostname IPv6",
        "sys_descr String",
        "hardware String",
        "os String",
        "serial String",
        "object_id String",
        "uptime Int64",
        "location String",
        "lat Float64",
        "lng Float64",
        "neighbour String",
        "if_alias String",
        "if_name String",
        "if_type Int32",
        "mtu Int64",
        "speed Int64",
        "mac_address String",
        "admin_status Bool",
        "oper_status Bool",
        "if_in_multicast_pkts UInt64",
        "if_in_broadcast_pkts UInt64",
        "if_out_multicast_pkts UInt64",
        "if_out_broadcast_pkts UInt64",
        "if_hcin_octets UInt64",
        "if_hcin_ucast_pkts UInt64",
        "if_hcin_multicast_pkts UInt64",
        "if_hcin_broadcast_pkts UInt64",
        "if_hcout_octets UInt64",
        "if_hcout_ucast_pkts UInt64",
        "if_hcout_multicast_pkts UInt64",
        "if_hcout_broadcast_pkts UInt64",
        "if_high_speed UInt64",
        "if_counter_discontinuity_time UInt64",
        "if_in_discards Int64",
        "if_in_errors Int64",
        "if_out_discards Int64",
        "if_out_errors Int64",
    ];

    let mut cursor = 0;
    for column in &columns {
        let at = ddl[cursor..]
            .find(column)
            .unwrap_or_else(|| panic!("column {:?} missing or out of order", column));
        cursor += at + column.len();
    }
}
