//! Forward-only schema migrations, embedded at compile time.
//!
//! The applied version is stored in SQLite's `user_version` pragma. Each
//! migration runs in its own transaction together with the version bump, so
//! a failed migration leaves the previous version in place.

use anyhow::{bail, Context, Result};
use rusqlite::Connection;

#[derive(Debug)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "create_test_data",
    sql: include_str!("../../migrations/0001_create_test_data.sql"),
}];

pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

pub fn current_version(conn: &Connection) -> Result<u32> {
    let version: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

/// Apply every migration newer than the database's recorded version.
/// Returns the number of migrations applied.
pub fn migrate(conn: &mut Connection) -> Result<usize> {
    let current = current_version(conn).context("unable to read schema version")?;
    let latest = latest_version();
    if current > latest {
        bail!("database schema version {current} is newer than the latest known version {latest}");
    }

    let mut applied = 0;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        log::info!(
            "Applying migration {:04}_{}",
            migration.version,
            migration.name
        );
        let tx = conn.transaction()?;
        tx.execute_batch(migration.sql).with_context(|| {
            format!(
                "migration {} ({}) failed",
                migration.version, migration.name
            )
        })?;
        tx.pragma_update(None, "user_version", migration.version)?;
        tx.commit()?;
        applied += 1;
    }

    if applied == 0 {
        log::debug!("Schema already at version {current}");
    }
    Ok(applied)
}
