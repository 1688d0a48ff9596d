use anyhow::Result;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Arc;

use crate::list::Snapshot;

/// Authoritative storage for the collection. Mutations and the snapshot
/// read that follows them run under one lock acquisition, so every
/// snapshot handed to the hub reflects a single consistent state.
pub struct ListStore {
    conn: Arc<Mutex<Connection>>,
}

impl ListStore {
    pub fn new(dir: &Path) -> Result<Self> {
        let db_path = dir.join("leads.db");
        let conn = Connection::open(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Arc::new(Mutex::new(Connection::open_in_memory()?)),
        })
    }

    pub fn initialize(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS leads (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                value TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Insert `value` at the end of the collection and return the
    /// resulting snapshot.
    pub fn append(&self, value: &str) -> Result<Snapshot> {
        let conn = self.conn.lock();

        conn.execute(
            "INSERT INTO leads (value, created_at) VALUES (?1, ?2)",
            params![value, Utc::now().to_rfc3339()],
        )?;

        Self::snapshot_locked(&conn)
    }

    /// Delete the entire collection. The collection key itself is gone
    /// afterwards, so the snapshot reports absent rather than empty.
    pub fn clear_all(&self) -> Result<Snapshot> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM leads", [])?;

        Ok(Snapshot::absent())
    }

    pub fn snapshot(&self) -> Result<Snapshot> {
        Self::snapshot_locked(&self.conn.lock())
    }

    fn snapshot_locked(conn: &Connection) -> Result<Snapshot> {
        let mut stmt = conn.prepare("SELECT value FROM leads ORDER BY id")?;
        let values = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if values.is_empty() {
            Ok(Snapshot::absent())
        } else {
            Ok(Snapshot::of(values))
        }
    }
}
