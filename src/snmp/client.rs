//! SNMP session handling.
//!
//! Builds a `snmp2` session from a device's inventory credentials and
//! exposes subtree walks returning owned varbinds. v1 walks with GetNext,
//! v2c/v3 with GetBulk. Every request is bounded by a timeout and retried;
//! the session timeout is also the cancellation bound for an in-flight
//! collection.

use std::time::Duration;

use num_bigint::BigInt;
use snmp2::{v3, AsyncSession, Oid, Value};
use thiserror::Error;
use tokio::time::timeout;
use tracing::debug;

use crate::models::Device;

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Retries after the first failed attempt.
pub const REQUEST_RETRIES: u32 = 3;

/// Upper bound on varbinds per GetBulk PDU.
pub const BULK_REPETITIONS: u32 = 30;

/// Errors raised while collecting one device. All of these are
/// device-level: the device is skipped for the tick and polling continues.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("device has no hostname")]
    MissingHostname,
    #[error("device has no snmp version")]
    MissingVersion,
    #[error("unsupported snmp version {0:?}")]
    UnsupportedVersion(String),
    #[error("v2c device has no community")]
    MissingCommunity,
    #[error("incomplete v3 credentials: {0} not set")]
    IncompleteCredentials(&'static str),
    #[error("unknown v3 auth level {0:?}")]
    UnknownAuthLevel(String),
    #[error("interface index can not be non integer")]
    InterfaceIndexNotInteger,
    #[error("oid {0:?} is not encodable")]
    InvalidOid(Vec<u64>),
    #[error("request timed out")]
    Timeout,
    #[error("session error: {0}")]
    Session(#[from] std::io::Error),
    #[error("snmp error: {0}")]
    Snmp(#[from] snmp2::Error),
}

/// An owned SNMP value, decoupled from the response buffer it was read
/// from.
#[derive(Debug, Clone, PartialEq)]
pub enum SnmpValue {
    Integer(i64),
    OctetString(Vec<u8>),
    Counter32(u32),
    Unsigned32(u32),
    Timeticks(u32),
    Counter64(u64),
    IpAddress([u8; 4]),
    Null,
    EndOfMibView,
    Other,
}

impl From<&Value<'_>> for SnmpValue {
    fn from(value: &Value<'_>) -> Self {
        match value {
            Value::Integer(n) => SnmpValue::Integer(*n),
            Value::OctetString(s) => SnmpValue::OctetString(s.to_vec()),
            Value::Counter32(n) => SnmpValue::Counter32(*n),
            Value::Unsigned32(n) => SnmpValue::Unsigned32(*n),
            Value::Timeticks(n) => SnmpValue::Timeticks(*n),
            Value::Counter64(n) => SnmpValue::Counter64(*n),
            Value::IpAddress(ip) => SnmpValue::IpAddress(*ip),
            Value::Null => SnmpValue::Null,
            Value::EndOfMibView => SnmpValue::EndOfMibView,
            _ => SnmpValue::Other,
        }
    }
}

impl SnmpValue {
    /// Numeric reading, zero when the value is not numeric.
    pub fn as_int(&self) -> i64 {
        match self {
            SnmpValue::Integer(n) => *n,
            SnmpValue::Counter32(n) => i64::from(*n),
            SnmpValue::Unsigned32(n) => i64::from(*n),
            SnmpValue::Timeticks(n) => i64::from(*n),
            SnmpValue::Counter64(n) => *n as i64,
            _ => 0,
        }
    }

    /// Unbounded numeric reading, zero when the value is not numeric.
    pub fn as_big_int(&self) -> BigInt {
        match self {
            SnmpValue::Integer(n) => BigInt::from(*n),
            SnmpValue::Counter32(n) => BigInt::from(*n),
            SnmpValue::Unsigned32(n) => BigInt::from(*n),
            SnmpValue::Timeticks(n) => BigInt::from(*n),
            SnmpValue::Counter64(n) => BigInt::from(*n),
            _ => BigInt::from(0),
        }
    }

    /// Default rendering used where a string field received a non-string
    /// value: decimal for numerics, dotted quad for addresses.
    pub fn render(&self) -> String {
        match self {
            SnmpValue::OctetString(s) => String::from_utf8_lossy(s).to_string(),
            SnmpValue::IpAddress(ip) => format!("{}.{}.{}.{}", ip[0], ip[1], ip[2], ip[3]),
            SnmpValue::Null | SnmpValue::EndOfMibView | SnmpValue::Other => String::new(),
            numeric => numeric.as_int().to_string(),
        }
    }
}

/// One varbind from a walk: instance OID components plus its value.
pub type WalkedBind = (Vec<u64>, SnmpValue);

enum WalkMode {
    GetNext,
    GetBulk,
}

/// An open session against one device's SNMP agent.
pub struct SnmpSession {
    session: AsyncSession,
    mode: WalkMode,
}

impl std::fmt::Debug for SnmpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnmpSession").finish_non_exhaustive()
    }
}

impl SnmpSession {
    /// Open a session for the device, validating credentials for its
    /// declared SNMP version. Fails fast when mandatory credentials are
    /// missing.
    pub async fn open(device: &Device) -> Result<Self, CollectError> {
        let host = device
            .hostname
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or(CollectError::MissingHostname)?;
        let version = device
            .snmp_ver
            .as_deref()
            .ok_or(CollectError::MissingVersion)?;
        let addr = format!("{}:{}", host, device.agent_port());

        if device.transport.as_deref() == Some("tcp") {
            debug!("Device {} requests tcp transport, polling over udp", addr);
        }

        let (session, mode) = match version {
            "1" => {
                let community = device
                    .community
                    .as_deref()
                    .ok_or(CollectError::MissingCommunity)?;
                let session = AsyncSession::new_v1(addr.as_str(), community.as_bytes(), 0).await?;
                (session, WalkMode::GetNext)
            }
            "v2c" => {
                let community = device
                    .community
                    .as_deref()
                    .ok_or(CollectError::MissingCommunity)?;
                let session = AsyncSession::new_v2c(addr.as_str(), community.as_bytes(), 0).await?;
                (session, WalkMode::GetBulk)
            }
            "v3" => {
                let security = build_v3_security(device)?;
                let mut session = AsyncSession::new_v3(addr.as_str(), 0, security).await?;
                // Engine id and time discovery.
                timeout(REQUEST_TIMEOUT, session.init())
                    .await
                    .map_err(|_| CollectError::Timeout)??;
                (session, WalkMode::GetBulk)
            }
            other => return Err(CollectError::UnsupportedVersion(other.to_string())),
        };

        Ok(Self { session, mode })
    }

    /// Walk one OID subtree, returning every varbind under it.
    pub async fn bulk_walk(&mut self, base: &[u64]) -> Result<Vec<WalkedBind>, CollectError> {
        let mut results = Vec::new();
        let mut current = base.to_vec();

        'walk: loop {
            let binds = match self.mode {
                WalkMode::GetBulk => self.getbulk_owned(&current).await?,
                WalkMode::GetNext => self.getnext_owned(&current).await?,
            };
            if binds.is_empty() {
                break;
            }

            let mut advanced = false;
            for (oid, value) in binds {
                if !oid.starts_with(base) || value == SnmpValue::EndOfMibView {
                    break 'walk;
                }
                // An agent that stops advancing would loop forever.
                if oid.as_slice() <= current.as_slice() {
                    break 'walk;
                }
                current = oid.clone();
                results.push((oid, value));
                advanced = true;
            }
            if !advanced {
                break;
            }
        }

        Ok(results)
    }

    async fn getbulk_owned(&mut self, from: &[u64]) -> Result<Vec<WalkedBind>, CollectError> {
        let oid = encode_oid(from)?;
        let mut last_err = CollectError::Timeout;

        for _attempt in 0..=REQUEST_RETRIES {
            match timeout(
                REQUEST_TIMEOUT,
                self.session.getbulk(&[&oid], 0, BULK_REPETITIONS),
            )
            .await
            {
                Err(_) => last_err = CollectError::Timeout,
                Ok(Err(e)) => last_err = CollectError::Snmp(e),
                Ok(Ok(pdu)) => return Ok(own_varbinds(pdu.varbinds)),
            }
        }

        Err(last_err)
    }

    async fn getnext_owned(&mut self, from: &[u64]) -> Result<Vec<WalkedBind>, CollectError> {
        let oid = encode_oid(from)?;
        let mut last_err = CollectError::Timeout;

        for _attempt in 0..=REQUEST_RETRIES {
            match timeout(REQUEST_TIMEOUT, self.session.getnext(&oid)).await {
                Err(_) => last_err = CollectError::Timeout,
                Ok(Err(e)) => last_err = CollectError::Snmp(e),
                Ok(Ok(pdu)) => return Ok(own_varbinds(pdu.varbinds)),
            }
        }

        Err(last_err)
    }
}

fn encode_oid(components: &[u64]) -> Result<Oid<'static>, CollectError> {
    Oid::from(components)
        .map(|oid| oid.to_owned())
        .map_err(|_| CollectError::InvalidOid(components.to_vec()))
}

fn own_varbinds<'a>(varbinds: impl IntoIterator<Item = (Oid<'a>, Value<'a>)>) -> Vec<WalkedBind> {
    let mut out = Vec::new();
    for (oid, value) in varbinds {
        // Components past u64 cannot name a registered metric; drop them.
        if let Some(components) = oid.iter() {
            out.push((components.collect(), SnmpValue::from(&value)));
        }
    }
    out
}

/// Build SNMPv3 USM security for the device's auth level. Credential
/// requirements grow with the level; the algorithm defaults are SHA and
/// AES.
fn build_v3_security(device: &Device) -> Result<v3::Security, CollectError> {
    let username = device
        .auth_name
        .as_deref()
        .ok_or(CollectError::IncompleteCredentials("authname"))?;
    let level = device
        .auth_level
        .as_deref()
        .ok_or(CollectError::IncompleteCredentials("authlevel"))?;

    match level {
        "noAuthNoPriv" => Ok(v3::Security::new(username.as_bytes(), b"")),
        "authNoPriv" => {
            let auth_pass = device
                .auth_pass
                .as_deref()
                .ok_or(CollectError::IncompleteCredentials("authpass"))?;
            Ok(v3::Security::new(username.as_bytes(), auth_pass.as_bytes())
                .with_auth_protocol(auth_protocol(device)))
        }
        "authPriv" => {
            let auth_pass = device
                .auth_pass
                .as_deref()
                .ok_or(CollectError::IncompleteCredentials("authpass"))?;
            let priv_pass = device
                .crypto_pass
                .as_deref()
                .ok_or(CollectError::IncompleteCredentials("cryptopass"))?;
            Ok(v3::Security::new(username.as_bytes(), auth_pass.as_bytes())
                .with_auth_protocol(auth_protocol(device))
                .with_auth(v3::Auth::AuthPriv {
                    cipher: priv_cipher(device),
                    privacy_password: priv_pass.as_bytes().to_vec(),
                }))
        }
        other => Err(CollectError::UnknownAuthLevel(other.to_string())),
    }
}

fn auth_protocol(device: &Device) -> v3::AuthProtocol {
    match device.auth_algo.as_deref() {
        Some("MD5") | Some("md5") => v3::AuthProtocol::Md5,
        _ => v3::AuthProtocol::Sha1,
    }
}

fn priv_cipher(device: &Device) -> v3::Cipher {
    match device.crypto_algo.as_deref() {
        Some("DES") | Some("des") => v3::Cipher::Des,
        Some("AES-192") | Some("aes-192") => v3::Cipher::Aes192,
        Some("AES-256") | Some("aes-256") => v3::Cipher::Aes256,
        _ => v3::Cipher::Aes128,
    }
}
