//! Configuration settings structures.
//!
//! These structs represent the full poller configuration, read from the
//! environment at startup. Missing required variables and non-numeric
//! values where a number is expected are fatal.

use anyhow::{Context, Result};
use std::env;

/// Top-level poller configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Dispatcher tick interval, in seconds.
    pub polling_interval_seconds: u64,
    /// Number of poller worker tasks.
    pub workers_num: usize,
    /// Log filter (defaults to "info").
    pub log_level: String,

    /// Optional fleet shard: skip this many devices per tick.
    pub worker_offset: Option<usize>,
    /// Optional fleet shard: poll at most this many devices per tick.
    pub worker_range: Option<usize>,

    /// Override for the inventory device list query.
    pub query: Option<String>,

    pub database: DatabaseSettings,
    pub clickhouse: ClickhouseSettings,
}

/// Inventory (MySQL) connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: String,
    pub name: String,
}

impl DatabaseSettings {
    /// Build a MySQL connection string.
    pub fn connection_string(&self) -> String {
        format!(
            "mysql://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.name
        )
    }
}

/// ClickHouse sink settings.
#[derive(Debug, Clone)]
pub struct ClickhouseSettings {
    pub db: String,
    pub username: String,
    pub password: String,
    pub addr: String,
    pub port: String,
    /// Target table for interface rows.
    pub interfaces_table_name: String,
    /// Capacity of the in-memory result queue.
    pub queue_length: usize,
    /// Rows per batch insert.
    pub flush_frequency: usize,
    /// Number of writer tasks draining the queue.
    pub concurrency: usize,
}

impl ClickhouseSettings {
    /// HTTP endpoint URL for the `clickhouse` client.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.addr, self.port)
    }
}

impl Settings {
    /// Read the full configuration from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            polling_interval_seconds: required_parsed("POLLING_INTERVAL_SECONDS")?,
            workers_num: required_parsed("WORKERS_NUM")?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            worker_offset: optional_parsed("WORKER_OFFSET")?,
            worker_range: optional_parsed("WORKER_RANGE")?,
            query: env::var("QUERY").ok().filter(|q| !q.is_empty()),
            database: DatabaseSettings {
                username: required("DB_USERNAME")?,
                password: required("DB_PASSWORD")?,
                host: required("DB_HOST")?,
                port: required("DB_PORT")?,
                name: required("DB_NAME")?,
            },
            clickhouse: ClickhouseSettings {
                db: required("CLICKHOUSE_DB")?,
                username: required("CLICKHOUSE_USERNAME")?,
                password: required("CLICKHOUSE_PASSWORD")?,
                addr: required("CLICKHOUSE_ADDR")?,
                port: required("CLICKHOUSE_PORT")?,
                interfaces_table_name: required("CLICKHOUSE_INTERFACES_TABLE_NAME")?,
                queue_length: required_parsed("CLICKHOUSE_QUEUE_LENGTH")?,
                flush_frequency: required_parsed("CLICKHOUSE_FLUSH_FREQUENCY")?,
                concurrency: optional_parsed("CLICKHOUSE_CONCURRENCY")?.unwrap_or(10),
            },
        })
    }
}

fn required(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("{} must be set", name))
}

fn required_parsed<T>(name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    required(name)?
        .parse()
        .with_context(|| format!("{} must be numeric", name))
}

fn optional_parsed<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.is_empty() => {
            let parsed = raw
                .parse()
                .with_context(|| format!("{} must be numeric", name))?;
            Ok(Some(parsed))
        }
        _ => Ok(None),
    }
}
