//! Durable queue snapshot storage
//!
//! The full ordered case list is the unit of durability: every queue mutation
//! writes the whole list as one JSON snapshot before the mutation is
//! considered committed. A crash between mutation and persistence loses at
//! most the latest single write.

use crate::case::Case;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};
use vigil_core::now_ms;

/// Errors from the snapshot store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// SQLite-backed store holding the serialized priority queue.
pub struct QueueStore {
    conn: Connection,
}

impl QueueStore {
    /// Create or open a snapshot store at the specified path.
    ///
    /// Uses WAL mode so a committed snapshot survives a crash.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();

        info!(path = %path.display(), "Opening queue store");

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::init_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Open an in-memory store, mainly for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS queue_snapshot (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                payload TEXT NOT NULL,
                queue_size INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        Ok(())
    }

    /// Load the persisted case list, or an empty list if no snapshot exists.
    pub fn load(&self) -> Result<Vec<Case>, StoreError> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM queue_snapshot WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(json) => {
                let cases: Vec<Case> = serde_json::from_str(&json)?;
                info!(queue_size = cases.len(), "Loaded queue snapshot");
                Ok(cases)
            }
            None => {
                info!("No existing queue snapshot, starting fresh");
                Ok(Vec::new())
            }
        }
    }

    /// Persist the full ordered case list as one snapshot row.
    pub fn save(&self, cases: &[Case]) -> Result<(), StoreError> {
        let payload = serde_json::to_string(cases)?;

        self.conn.execute(
            r#"
            INSERT INTO queue_snapshot (id, payload, queue_size, updated_at)
            VALUES (1, ?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                payload = excluded.payload,
                queue_size = excluded.queue_size,
                updated_at = excluded.updated_at
            "#,
            params![payload, cases.len() as i64, now_ms() as i64],
        )?;

        debug!(queue_size = cases.len(), "Saved queue snapshot");
        Ok(())
    }
}
