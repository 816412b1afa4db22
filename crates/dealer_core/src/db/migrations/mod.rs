//! Ordered dealer schema migrations.
//!
//! Each step runs inside one transaction together with the
//! `PRAGMA user_version` bump, so a failed step leaves the schema untouched.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "dealer",
    sql: include_str!("0001_dealer.sql"),
}];

/// Highest schema version this binary can write.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings `conn` up to [`latest_version`] and returns the version it started at.
///
/// # Errors
/// - [`DbError::SchemaTooNew`] when the database is ahead of this binary.
/// - [`DbError::Sqlite`] when a step fails; nothing is applied in that case.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<u32> {
    let from = current_user_version(conn)?;
    let supported = latest_version();
    if from > supported {
        return Err(DbError::SchemaTooNew {
            found: from,
            supported,
        });
    }

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > from)
        .collect();
    if pending.is_empty() {
        return Ok(from);
    }

    let tx = conn.transaction()?;
    for migration in pending {
        debug!(
            "event=db_migrate_step module=db version={} name={}",
            migration.version, migration.name
        );
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from} to_version={supported}");
    Ok(from)
}

pub(crate) fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}
