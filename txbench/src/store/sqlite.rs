use super::{configure_connection, migrations, Datastore, TARGET_TABLE};
use crate::record::Record;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, Transaction};

const INSERT_SQL: &str =
    "INSERT INTO test_data (payload, description, counter1, counter2) VALUES (?1, ?2, ?3, ?4)";

/// SQLite-backed [`Datastore`] owning the run's single connection.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the database named by `url`. Accepts a plain path, a `file:` URI
    /// or either form prefixed with `sqlite://`.
    pub fn open(url: &str) -> Result<Self> {
        let path = database_path(url);
        let conn = Connection::open(path)
            .with_context(|| format!("unable to open database at {path}"))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("unable to open in-memory database")?;
        Self::from_connection(conn)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        configure_connection(&conn).context("unable to configure connection")?;
        Ok(Self { conn })
    }

    /// Bring the schema up to date so the target table exists.
    pub fn bootstrap(&mut self) -> Result<()> {
        migrations::migrate(&mut self.conn).context("failed to run migrations")?;
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Datastore for SqliteStore {
    fn clear(&mut self) -> Result<()> {
        self.conn
            .execute(&format!("DELETE FROM {TARGET_TABLE}"), [])
            .context("failed to clear table")?;
        Ok(())
    }

    fn insert_transaction(&mut self, rows: &[Record]) -> Result<()> {
        let tx = self
            .conn
            .transaction()
            .context("failed to begin transaction")?;

        if let Err(err) = insert_rows(&tx, rows) {
            if let Err(rollback_err) = tx.rollback() {
                log::error!("Rollback after failed insert also failed: {rollback_err}");
            }
            return Err(err);
        }

        // A failed COMMIT drops the transaction, which rolls it back.
        tx.commit().context("failed to commit transaction")?;
        Ok(())
    }

    fn row_count(&mut self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {TARGET_TABLE}"), [], |r| {
                r.get(0)
            })
            .context("failed to count rows")?;
        Ok(count as u64)
    }
}

fn insert_rows(tx: &Transaction<'_>, rows: &[Record]) -> Result<()> {
    let mut stmt = tx.prepare_cached(INSERT_SQL)?;
    for (offset, row) in rows.iter().enumerate() {
        stmt.execute(params![
            row.payload,
            row.description,
            row.counter1,
            row.counter2
        ])
        .with_context(|| format!("insert of row {offset} in transaction failed"))?;
    }
    Ok(())
}

fn database_path(url: &str) -> &str {
    let trimmed = url.trim();
    trimmed.strip_prefix("sqlite://").unwrap_or(trimmed)
}
