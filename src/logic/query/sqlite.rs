//! SQLite Inbox Store
//!
//! Reads `sms_inbox(_id, address, body, date)`. The table may come from
//! elsewhere with columns missing or oddly typed; such fields are read as
//! NULL instead of failing the query.
//!
//! ## Schema
//! - `_id`: INTEGER PRIMARY KEY AUTOINCREMENT
//! - `address`: TEXT
//! - `body`: TEXT
//! - `date`: INTEGER (epoch millis)

use std::collections::HashSet;
use std::path::Path;

use parking_lot::Mutex;
use rusqlite::types::ValueRef;
use rusqlite::Connection;

use super::store::{MessageStore, StoreRecord};
use crate::constants::INBOX_TABLE;
use crate::logic::error::StoreError;

/// Columns read, in projection order
const COLUMNS: [&str; 4] = ["_id", "address", "body", "date"];

pub struct SqliteMessageStore {
    conn: Mutex<Connection>,
}

impl SqliteMessageStore {
    /// Open (or create) the inbox database and make sure the table exists
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        }

        let conn = Connection::open(path).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let store = Self { conn: Mutex::new(conn) };
        store.ensure_schema()?;

        log::info!("Opened SMS inbox at {:?}", path);
        Ok(store)
    }

    /// Open an existing database as-is, without creating the table
    pub fn attach(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let store = Self { conn: Mutex::new(conn) };
        store.ensure_schema()?;
        Ok(store)
    }

    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        self.conn.lock().execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {INBOX_TABLE} (
                _id     INTEGER PRIMARY KEY AUTOINCREMENT,
                address TEXT,
                body    TEXT,
                date    INTEGER
            );
            CREATE INDEX IF NOT EXISTS idx_{INBOX_TABLE}_date ON {INBOX_TABLE}(date);"
        ))?;
        Ok(())
    }

    /// Add one message, returns its row id
    pub fn insert(&self, address: &str, body: &str, date: i64) -> Result<i64, StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            &format!("INSERT INTO {INBOX_TABLE} (address, body, date) VALUES (?1, ?2, ?3)"),
            (address, body, date),
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn existing_columns(conn: &Connection) -> Result<HashSet<String>, StoreError> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({INBOX_TABLE})"))?;
        let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
        Ok(names.filter_map(|n| n.ok()).collect())
    }
}

impl MessageStore for SqliteMessageStore {
    fn read_recent(&self, limit: usize) -> Result<Vec<StoreRecord>, StoreError> {
        let conn = self.conn.lock();

        let present = Self::existing_columns(&conn)?;
        if present.is_empty() {
            return Err(StoreError::Unavailable(format!("table {} not found", INBOX_TABLE)));
        }

        let projection: Vec<&str> = COLUMNS
            .iter()
            .map(|c| if present.contains(*c) { *c } else { "NULL" })
            .collect();
        let order = if present.contains("date") { "ORDER BY date DESC" } else { "" };
        let sql = format!(
            "SELECT {} FROM {} {} LIMIT ?1",
            projection.join(", "),
            INBOX_TABLE,
            order
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([limit as i64], |row| {
            Ok(StoreRecord {
                id: text_of(row.get_ref(0)?),
                address: text_of(row.get_ref(1)?),
                body: text_of(row.get_ref(2)?),
                date: int_of(row.get_ref(3)?),
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            match row {
                Ok(record) => records.push(record),
                Err(e) => log::warn!("Skipping unreadable inbox row: {}", e),
            }
        }
        Ok(records)
    }
}

// ============================================================================
// VALUE CONVERSION
// ============================================================================

fn text_of(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Null | ValueRef::Blob(_) => None,
    }
}

fn int_of(value: ValueRef<'_>) -> Option<i64> {
    match value {
        ValueRef::Integer(i) => Some(i),
        ValueRef::Real(f) => Some(f as i64),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes).ok()?.trim().parse().ok(),
        ValueRef::Null | ValueRef::Blob(_) => None,
    }
}
