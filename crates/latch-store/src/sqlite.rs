//! SQLite-based store implementation

use chrono::{DateTime, Local, NaiveDate};
use latch_domain::HouseholdSnapshot;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::{AuditEvent, Store, StoreResult};

/// SQLite-based store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            r#"
            -- Household snapshot (single row)
            CREATE TABLE IF NOT EXISTS snapshot (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                snapshot_json TEXT NOT NULL
            );

            -- Audit log (append-only)
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                event_json TEXT NOT NULL
            );

            -- Shared usage counter cell, one row per day
            CREATE TABLE IF NOT EXISTS usage (
                day TEXT PRIMARY KEY,
                seconds INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_log(timestamp);
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

impl Store for SqliteStore {
    fn load_snapshot(&self) -> StoreResult<Option<HouseholdSnapshot>> {
        let conn = self.conn.lock().unwrap();

        let json: Option<String> = conn
            .query_row("SELECT snapshot_json FROM snapshot WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        let Some(json) = json else {
            return Ok(None);
        };

        // A blob that no longer decodes is treated as absent: the engine
        // cold-starts rather than failing to start at all.
        match serde_json::from_str(&json) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                warn!(error = %e, "Stored snapshot not decodable, treating as absent");
                Ok(None)
            }
        }
    }

    fn save_snapshot(&self, snapshot: &HouseholdSnapshot) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let json = serde_json::to_string(snapshot)?;

        conn.execute(
            "INSERT INTO snapshot (id, snapshot_json) VALUES (1, ?)
             ON CONFLICT(id) DO UPDATE SET snapshot_json = excluded.snapshot_json",
            params![json],
        )?;

        debug!(bytes = json.len(), "Snapshot saved");
        Ok(())
    }

    fn append_audit(&self, mut event: AuditEvent) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let event_json = serde_json::to_string(&event.event)?;

        conn.execute(
            "INSERT INTO audit_log (timestamp, event_json) VALUES (?, ?)",
            params![event.timestamp.to_rfc3339(), event_json],
        )?;

        event.id = conn.last_insert_rowid();
        debug!(event_id = event.id, "Audit event appended");

        Ok(())
    }

    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, timestamp, event_json FROM audit_log ORDER BY id DESC LIMIT ?",
        )?;

        let rows = stmt.query_map([limit], |row| {
            let id: i64 = row.get(0)?;
            let timestamp_str: String = row.get(1)?;
            let event_json: String = row.get(2)?;
            Ok((id, timestamp_str, event_json))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (id, timestamp_str, event_json) = row?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
                .map(|dt| dt.with_timezone(&Local))
                .unwrap_or_else(|_| latch_util::now());
            let event: crate::AuditEventType = serde_json::from_str(&event_json)?;

            events.push(AuditEvent {
                id,
                timestamp,
                event,
            });
        }

        Ok(events)
    }

    fn get_usage_seconds(&self, day: NaiveDate) -> StoreResult<u64> {
        let conn = self.conn.lock().unwrap();
        let day_str = day.format("%Y-%m-%d").to_string();

        let seconds: Option<i64> = conn
            .query_row(
                "SELECT seconds FROM usage WHERE day = ?",
                params![day_str],
                |row| row.get(0),
            )
            .optional()?;

        Ok(seconds.unwrap_or(0).max(0) as u64)
    }

    fn set_usage_seconds(&self, day: NaiveDate, seconds: u64) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let day_str = day.format("%Y-%m-%d").to_string();

        conn.execute(
            "INSERT INTO usage (day, seconds) VALUES (?, ?)
             ON CONFLICT(day) DO UPDATE SET seconds = excluded.seconds",
            params![day_str, seconds as i64],
        )?;

        Ok(())
    }

    fn is_healthy(&self) -> bool {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT 1", [], |_| Ok(())).is_ok()
    }
}
