//! Columnar store sink: a bounded queue of poll results drained by a pool
//! of batching writers into a ClickHouse table.

pub mod clickhouse;
pub mod writer;

pub use clickhouse::{InterfaceRecord, StoreClient};
pub use writer::run_writer;
