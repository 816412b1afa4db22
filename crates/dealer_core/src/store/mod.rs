//! SQL store handle with master/replica connection roles.
//!
//! # Responsibility
//! - Build connections from `SqlSettings` and hand them out by role.
//! - Host entity stores that issue SQL through those connections.
//!
//! # Invariants
//! - Writes go through `get_master()`, reads through `get_replica()`.
//! - Replica connections are read-only and never run migrations.
//! - With no replicas configured, reads fall back to the master.

pub mod dealer_store;
pub mod query;

use crate::db::{open_db, open_db_in_memory, open_db_read_only, DbResult};
use log::info;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlSettings {
    /// Database file; `None` opens a private in-memory database.
    pub data_source: Option<PathBuf>,
    /// Read-only connections opened next to the master. Ignored in memory.
    pub replica_count: u32,
    /// Busy timeout applied to every connection.
    pub query_timeout_secs: u64,
}

impl Default for SqlSettings {
    fn default() -> Self {
        Self {
            data_source: None,
            replica_count: 1,
            query_timeout_secs: 5,
        }
    }
}

impl SqlSettings {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            data_source: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Reads settings from JSON; absent keys take their defaults.
    pub fn from_json(data: impl Read) -> serde_json::Result<Self> {
        serde_json::from_reader(data)
    }

    fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

/// Explicit storage handle passed to every entity store.
pub struct SqlStore {
    master: Connection,
    replicas: Vec<Connection>,
    next_replica: Cell<usize>,
}

impl SqlStore {
    /// Opens the master (running migrations), then the replicas.
    pub fn open(settings: &SqlSettings) -> DbResult<Self> {
        let master = match &settings.data_source {
            Some(path) => open_db(path)?,
            None => open_db_in_memory()?,
        };
        master.busy_timeout(settings.query_timeout())?;

        let mut replicas = Vec::new();
        if let Some(path) = &settings.data_source {
            for _ in 0..settings.replica_count {
                let replica = open_db_read_only(path)?;
                replica.busy_timeout(settings.query_timeout())?;
                replicas.push(replica);
            }
        }

        info!(
            "event=store_open module=store status=ok mode={} replicas={}",
            if settings.data_source.is_some() { "file" } else { "memory" },
            replicas.len()
        );

        Ok(Self::from_connections(master, replicas))
    }

    /// Wraps already-open connections. The master must be migrated.
    pub fn from_connections(master: Connection, replicas: Vec<Connection>) -> Self {
        Self {
            master,
            replicas,
            next_replica: Cell::new(0),
        }
    }

    pub fn get_master(&self) -> &Connection {
        &self.master
    }

    /// Next replica in round-robin order, or the master when none exist.
    pub fn get_replica(&self) -> &Connection {
        if self.replicas.is_empty() {
            return &self.master;
        }
        let index = self.next_replica.get() % self.replicas.len();
        self.next_replica.set(index + 1);
        &self.replicas[index]
    }

    pub fn replica_count(&self) -> usize {
        self.replicas.len()
    }
}
