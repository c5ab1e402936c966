//! Unit tests for session credential validation.
//!
//! Every case here fails before a socket is opened: a device with
//! incomplete credentials for its declared version is rejected at session
//! creation and produces no metrics for the tick.

use snmpstream::models::Device;
use snmpstream::snmp::{CollectError, SnmpSession};

fn v2c_device() -> Device {
    Device {
        device_id: 1,
        hostname: Some("10.20.30.40".to_string()),
        sys_name: Some("edge-sw-01".to_string()),
        community: Some("public".to_string()),
        auth_level: None,
        auth_name: None,
        auth_pass: None,
        auth_algo: None,
        crypto_pass: None,
        crypto_algo: None,
        snmp_ver: Some("v2c".to_string()),
        port: 161,
        transport: Some("udp".to_string()),
        sys_object_id: None,
        sys_descr: None,
        sys_contact: None,
        version: None,
        hardware: None,
        features: None,
        os: None,
        status: true,
        serial: None,
        location: None,
        lat: None,
        lng: None,
        uptime_seconds: None,
    }
}

fn v3_device(level: &str) -> Device {
    let mut device = v2c_device();
    device.snmp_ver = Some("v3".to_string());
    device.community = None;
    device.auth_level = Some(level.to_string());
    device.auth_name = Some("poller".to_string());
    device.auth_pass = Some("authsecret".to_string());
    device.crypto_pass = Some("privsecret".to_string());
    device
}

// ==================== Missing Identity Tests ====================

#[tokio::test]
async fn test_open_rejects_missing_hostname() {
    let mut device = v2c_device();
    device.hostname = None;

    let err = SnmpSession::open(&device).await.unwrap_err();
    assert!(matches!(err, CollectError::MissingHostname));
}

#[tokio::test]
async fn test_open_rejects_empty_hostname() {
    let mut device = v2c_device();
    device.hostname = Some(String::new());

    let err = SnmpSession::open(&device).await.unwrap_err();
    assert!(matches!(err, CollectError::MissingHostname));
}

#[tokio::test]
async fn test_open_rejects_missing_version() {
    let mut device = v2c_device();
    device.snmp_ver = None;

    let err = SnmpSession::open(&device).await.unwrap_err();
    assert!(matches!(err, CollectError::MissingVersion));
}

#[tokio::test]
async fn test_open_rejects_unknown_version() {
    let mut device = v2c_device();
    device.snmp_ver = Some("v4".to_string());

    let err = SnmpSession::open(&device).await.unwrap_err();
    assert!(matches!(err, CollectError::UnsupportedVersion(v) if v == "v4"));
}

// ==================== Community Tests ====================

#[tokio::test]
async fn test_open_rejects_v2c_without_community() {
    let mut device = v2c_device();
    device.community = None;

    let err = SnmpSession::open(&device).await.unwrap_err();
    assert!(matches!(err, CollectError::MissingCommunity));
}

#[tokio::test]
async fn test_open_rejects_v1_without_community() {
    let mut device = v2c_device();
    device.snmp_ver = Some("1".to_string());
    device.community = None;

    let err = SnmpSession::open(&device).await.unwrap_err();
    assert!(matches!(err, CollectError::MissingCommunity));
}

// ==================== v3 Credential Tests ====================

#[tokio::test]
async fn test_open_rejects_v3_without_username() {
    let mut device = v3_device("authPriv");
    device.auth_name = None;

    let err = SnmpSession::open(&device).await.unwrap_err();
    assert!(matches!(err, CollectError::IncompleteCredentials("authname")));
}

#[tokio::test]
async fn test_open_rejects_v3_without_level() {
    let mut device = v3_device("authPriv");
    device.auth_level = None;

    let err = SnmpSession::open(&device).await.unwrap_err();
    assert!(matches!(err, CollectError::IncompleteCredentials("authlevel")));
}

#[tokio::test]
async fn test_open_rejects_auth_no_priv_without_passphrase() {
    let mut device = v3_device("authNoPriv");
    device.auth_pass = None;

    let err = SnmpSession::open(&device).await.unwrap_err();
    assert!(matches!(err, CollectError::IncompleteCredentials("authpass")));
}

#[tokio::test]
async fn test_open_rejects_auth_priv_without_privacy_passphrase() {
    let mut device = v3_device("authPriv");
    device.crypto_pass = None;

    let err = SnmpSession::open(&device).await.unwrap_err();
    assert!(matches!(err, CollectError::IncompleteCredentials("cryptopass")));
}

#[tokio::test]
async fn test_open_rejects_unknown_auth_level() {
    let device = v3_device("authMaybe");

    let err = SnmpSession::open(&device).await.unwrap_err();
    assert!(matches!(err, CollectError::UnknownAuthLevel(l) if l == "authMaybe"));
}
