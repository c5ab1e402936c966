//! snmpstream-poller: fleet SNMP interface poller daemon.

use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use snmpstream::backend;
use snmpstream::config::Settings;
use snmpstream::db::DbPool;
use snmpstream::store::StoreClient;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(settings.log_level.parse()?),
        )
        .init();

    tracing::info!("snmpstream {} poller starting", snmpstream::VERSION);

    let db = DbPool::new(&settings.database).await?;
    db.ping().await?;

    let store = StoreClient::new(&settings.clickhouse);
    store.init_schema().await?;

    backend::start_backend(Arc::new(settings), db, store).await
}
