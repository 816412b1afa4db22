//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file, in-memory or read-only SQLite connections.
//! - Configure connection pragmas required by store behavior.
//! - Trigger schema migrations before returning a writable connection.
//!
//! # Invariants
//! - Writable connections have `foreign_keys=ON` and migrations applied.
//! - Read-only connections are only returned at the latest schema version.

use super::migrations::{apply_migrations, current_user_version, latest_version};
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a SQLite database file and applies all pending migrations.
///
/// # Side effects
/// - Creates the file when missing.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_logged("file", || Connection::open(path), bootstrap_connection)
}

/// Opens an in-memory SQLite database and applies all pending migrations.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_logged("memory", Connection::open_in_memory, bootstrap_connection)
}

/// Opens an existing SQLite database file for reads only.
///
/// Used for replica connections. The database must already be migrated to
/// the version this binary knows; no migration is attempted.
pub fn open_db_read_only(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_logged(
        "read_only",
        || {
            Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
        },
        check_read_only_connection,
    )
}

fn open_logged(
    mode: &str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
    bootstrap: fn(&mut Connection) -> DbResult<()>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match open() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap(&mut conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
    apply_migrations(conn)?;
    Ok(())
}

fn check_read_only_connection(conn: &mut Connection) -> DbResult<()> {
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
    let found = current_user_version(conn)?;
    let required = latest_version();
    if found != required {
        return Err(DbError::ReplicaSchemaMismatch { found, required });
    }
    Ok(())
}
