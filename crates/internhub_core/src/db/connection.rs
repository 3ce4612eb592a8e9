use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Waiting time before a locked database reports `SQLITE_BUSY`.
const BUSY_WAIT: Duration = Duration::from_secs(5);

/// Opens (creating if needed) the database file at `path` and migrates it.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    let target = path.display().to_string();
    prepare(&target, Connection::open(path))
}

/// Fresh private database, used by tests and throwaway tooling.
pub fn open_db_in_memory() -> DbResult<Connection> {
    prepare(":memory:", Connection::open_in_memory())
}

/// Round-trips a trivial query; backs `GET /health`.
pub fn ping(conn: &Connection) -> DbResult<()> {
    conn.query_row("SELECT 1;", [], |row| row.get::<_, i64>(0))?;
    Ok(())
}

fn prepare(target: &str, opened: rusqlite::Result<Connection>) -> DbResult<Connection> {
    let started = Instant::now();
    let outcome = opened.map_err(DbError::from).and_then(|mut conn| {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.busy_timeout(BUSY_WAIT)?;
        apply_migrations(&mut conn)?;
        Ok(conn)
    });

    let elapsed_ms = started.elapsed().as_millis();
    match &outcome {
        Ok(_) => info!(
            "event=db_open module=db status=ok target={target} duration_ms={elapsed_ms}"
        ),
        Err(err) => error!(
            "event=db_open module=db status=error target={target} duration_ms={elapsed_ms} error={err}"
        ),
    }
    outcome
}
