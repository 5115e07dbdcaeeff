//! Append-only event log backed by SQLite.
//!
//! Every inbound message is appended here, as is every record created by the
//! ADD data-action. Records are never mutated or deleted. The connection is
//! wrapped in a Mutex since rusqlite's Connection is not Sync; WAL mode keeps
//! concurrent reads cheap while appends serialize behind the lock.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;
use std::sync::Mutex;

/// One event log row. `id` is unique and monotonic (SQLite AUTOINCREMENT).
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("event log unavailable: {0}")]
    Unavailable(String),
    #[error("event log query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Narrow interface the router and interpreter consume. Implemented by
/// [`SqliteEventLog`]; tests substitute counting or failing fakes.
pub trait EventLog: Send + Sync {
    /// Append a record with the current timestamp; returns the stored row.
    fn append(&self, text: &str) -> Result<LogRecord, StorageError>;

    /// The `n` most recent records, newest first (timestamp desc, id desc).
    fn recent(&self, n: usize) -> Result<Vec<LogRecord>, StorageError>;
}

/// SQLite-backed event log.
pub struct SqliteEventLog {
    conn: Mutex<Connection>,
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    text TEXT NOT NULL
);";

impl SqliteEventLog {
    /// Open (or create) the event log at the given path. Creates the parent
    /// directory, configures WAL mode, and ensures the schema exists.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        conn.execute_batch(SCHEMA)?;
        log::info!("event log opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory event log (for tests).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Unavailable(format!("lock poisoned: {}", e)))
    }
}

impl EventLog for SqliteEventLog {
    fn append(&self, text: &str) -> Result<LogRecord, StorageError> {
        let timestamp = Utc::now();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO log (timestamp, text) VALUES (?1, ?2)",
            rusqlite::params![timestamp.to_rfc3339(), text],
        )?;
        Ok(LogRecord {
            id: conn.last_insert_rowid(),
            timestamp,
            text: text.to_string(),
        })
    }

    fn recent(&self, n: usize) -> Result<Vec<LogRecord>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, timestamp, text FROM log ORDER BY timestamp DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map([n as i64], |row| {
            let id: i64 = row.get(0)?;
            let ts: String = row.get(1)?;
            let text: String = row.get(2)?;
            Ok((id, ts, text))
        })?;
        let mut records = Vec::new();
        for row in rows {
            let (id, ts, text) = row?;
            let timestamp = DateTime::parse_from_rfc3339(&ts)
                .map_err(|e| StorageError::Unavailable(format!("bad timestamp in row {}: {}", id, e)))?
                .with_timezone(&Utc);
            records.push(LogRecord {
                id,
                timestamp,
                text,
            });
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_assigns_monotonic_ids() {
        let log = SqliteEventLog::in_memory().unwrap();
        let a = log.append("first").unwrap();
        let b = log.append("second").unwrap();
        assert!(b.id > a.id);
    }

    #[test]
    fn recent_returns_newest_first_with_limit() {
        let log = SqliteEventLog::in_memory().unwrap();
        for i in 0..7 {
            log.append(&format!("msg {}", i)).unwrap();
        }
        let records = log.recent(5).unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].text, "msg 6");
        assert_eq!(records[4].text, "msg 2");
        for pair in records.windows(2) {
            assert!(pair[0].id > pair[1].id);
        }
    }

    #[test]
    fn recent_breaks_timestamp_ties_by_insertion_order() {
        let log = SqliteEventLog::in_memory().unwrap();
        // Insert two rows with an identical timestamp; the later insertion
        // (higher id) must come back first.
        {
            let conn = log.conn.lock().unwrap();
            let ts = Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO log (timestamp, text) VALUES (?1, ?2)",
                rusqlite::params![ts, "older"],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO log (timestamp, text) VALUES (?1, ?2)",
                rusqlite::params![ts, "newer"],
            )
            .unwrap();
        }
        let records = log.recent(2).unwrap();
        assert_eq!(records[0].text, "newer");
        assert_eq!(records[1].text, "older");
    }

    #[test]
    fn recent_on_empty_log_is_empty() {
        let log = SqliteEventLog::in_memory().unwrap();
        assert!(log.recent(5).unwrap().is_empty());
    }
}
