//! Connection setup for the dealer database.
//!
//! Writable connections (file or memory) migrate the `Dealer` schema on open.
//! Read-only connections back the store replicas and refuse any database
//! whose `PRAGMA user_version` differs from [`migrations::latest_version`].

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, open_db_read_only};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Database was written by a binary with newer dealer migrations.
    SchemaTooNew { found: u32, supported: u32 },
    /// Replica target is not at the schema version this binary writes.
    ReplicaSchemaMismatch { found: u32, required: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "dealer schema version {found} is newer than supported {supported}"
            ),
            Self::ReplicaSchemaMismatch { found, required } => write!(
                f,
                "replica opened at dealer schema version {found}, requires {required}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
