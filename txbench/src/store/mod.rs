//! Datastore access used by the benchmark core.
//!
//! The core only needs three operations on the target table, captured by the
//! [`Datastore`] trait. [`sqlite::SqliteStore`] is the production
//! implementation; tests substitute recording fakes.

pub mod migrations;
pub mod sqlite;

use crate::record::Record;
use anyhow::Result;
use rusqlite::Connection;

/// Name of the table every sample writes into.
pub const TARGET_TABLE: &str = "test_data";

/// Operations the executor, warmup controller and sampler perform against
/// the datastore. All calls block until the datastore acknowledges them.
pub trait Datastore {
    /// Delete every row from the target table. Clearing an empty table is a
    /// no-op.
    fn clear(&mut self) -> Result<()>;

    /// Insert `rows` inside exactly one transaction. Either every row is
    /// committed or the transaction is rolled back and an error returned.
    fn insert_transaction(&mut self, rows: &[Record]) -> Result<()>;

    /// Current number of rows in the target table.
    fn row_count(&mut self) -> Result<u64>;
}

/// Configure a connection for write-heavy benchmarking.
pub fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA cache_size = -65536;
         PRAGMA temp_store = MEMORY;",
    )?;
    Ok(())
}
