//! Inventory connection pool management.

use anyhow::{Context, Result};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tracing::info;

use crate::config::DatabaseSettings;

/// Shared inventory database handle.
#[derive(Debug, Clone)]
pub struct DbPool {
    pub pool: MySqlPool,
}

impl DbPool {
    /// Create a new inventory connection pool.
    pub async fn new(settings: &DatabaseSettings) -> Result<Self> {
        let conn_str = settings.connection_string();
        info!("Connecting to inventory database: {}", settings.name);

        let pool = MySqlPoolOptions::new()
            .max_connections(20)
            .connect(&conn_str)
            .await
            .with_context(|| {
                format!(
                    "Failed to connect to inventory at {}:{}",
                    settings.host, settings.port
                )
            })?;

        info!("Inventory connection pool established");
        Ok(Self { pool })
    }

    /// Test the database connection.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Inventory ping failed")?;
        Ok(())
    }
}
