//! Message Types
//!
//! Immutable inbound text messages, shared by the live stream and the query path.

use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};

// ============================================================================
// MESSAGE
// ============================================================================

/// A received text message.
///
/// `id` is an arrival token for stream-delivered messages and the store's
/// native identifier for queried ones; the two spaces are unrelated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub address: String,
    pub body: String,
    #[serde(rename = "date")]
    pub timestamp_millis: i64,
}

impl Message {
    pub fn new(id: impl Into<String>, address: impl Into<String>, body: impl Into<String>, timestamp_millis: i64) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
            body: body.into(),
            timestamp_millis,
        }
    }

    /// Sender to show on an alert; blank addresses become "Unknown"
    pub fn display_sender(&self) -> &str {
        if self.address.trim().is_empty() {
            crate::constants::UNKNOWN_SENDER
        } else {
            &self.address
        }
    }
}

// ============================================================================
// ARRIVAL IDS
// ============================================================================

static LAST_ARRIVAL_ID: AtomicI64 = AtomicI64::new(0);

/// Allocate an arrival id: wall-clock millis, bumped so ids never repeat
/// even when a batch lands inside one millisecond.
pub fn next_arrival_id() -> String {
    let now = chrono::Utc::now().timestamp_millis();
    let mut last = LAST_ARRIVAL_ID.load(Ordering::SeqCst);
    loop {
        let candidate = if now > last { now } else { last + 1 };
        match LAST_ARRIVAL_ID.compare_exchange(last, candidate, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => return candidate.to_string(),
            Err(actual) => last = actual,
        }
    }
}
