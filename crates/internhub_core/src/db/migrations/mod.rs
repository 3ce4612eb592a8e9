//! Ordered schema scripts. Script `n` in [`SCRIPTS`] upgrades the database
//! to version `n + 1`, recorded in `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

const SCRIPTS: [&str; 3] = [
    include_str!("0001_people.sql"),
    include_str!("0002_workflows.sql"),
    include_str!("0003_certificates.sql"),
];

/// Highest schema version this build can produce.
pub fn latest_version() -> u32 {
    SCRIPTS.len() as u32
}

/// Current `user_version` of `conn`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Runs every script above the stored version in a single transaction.
///
/// Refuses to touch databases stamped with a version newer than
/// [`latest_version`].
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let stored = schema_version(conn)?;
    let latest = latest_version();
    if stored > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: stored,
            latest_supported: latest,
        });
    }

    if stored == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (script, version) in SCRIPTS.iter().zip(1u32..).skip(stored as usize) {
        tx.execute_batch(script)?;
        tx.pragma_update(None, "user_version", version)?;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={stored} to_version={latest}");
    Ok(())
}
