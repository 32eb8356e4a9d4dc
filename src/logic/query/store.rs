//! Message Store Seam
//!
//! The query path only needs "newest first, at most N". Records come back
//! with every field optional; defaults are applied by the service.

use parking_lot::Mutex;

use crate::logic::error::StoreError;
use crate::logic::message::Message;

/// Raw row as read from a store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreRecord {
    pub id: Option<String>,
    pub address: Option<String>,
    pub body: Option<String>,
    pub date: Option<i64>,
}

impl StoreRecord {
    pub fn new(id: impl Into<String>, address: impl Into<String>, body: impl Into<String>, date: i64) -> Self {
        Self {
            id: Some(id.into()),
            address: Some(address.into()),
            body: Some(body.into()),
            date: Some(date),
        }
    }

    /// Missing strings become "", a missing date becomes 0
    pub fn into_message(self) -> Message {
        Message {
            id: self.id.unwrap_or_default(),
            address: self.address.unwrap_or_default(),
            body: self.body.unwrap_or_default(),
            timestamp_millis: self.date.unwrap_or(0),
        }
    }
}

/// Bounded, ordered read primitive
pub trait MessageStore: Send + Sync {
    /// Up to `limit` records, descending by date
    fn read_recent(&self, limit: usize) -> Result<Vec<StoreRecord>, StoreError>;
}

// ============================================================================
// MEMORY STORE
// ============================================================================

/// In-process store for tests and the no-database mode of the daemon
#[derive(Debug, Default)]
pub struct MemoryMessageStore {
    records: Mutex<Vec<StoreRecord>>,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = StoreRecord>) -> Self {
        Self {
            records: Mutex::new(records.into_iter().collect()),
        }
    }

    pub fn push(&self, record: StoreRecord) {
        self.records.lock().push(record);
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MessageStore for MemoryMessageStore {
    fn read_recent(&self, limit: usize) -> Result<Vec<StoreRecord>, StoreError> {
        let mut records = self.records.lock().clone();
        records.sort_by(|a, b| b.date.unwrap_or(0).cmp(&a.date.unwrap_or(0)));
        records.truncate(limit);
        Ok(records)
    }
}
