//! Message Source
//!
//! Push-based delivery of raw SMS batches. The platform calls back with one
//! or more messages per invocation, possibly on its own thread.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::logic::error::{PduError, SourceError};
use crate::logic::message::Message;

// ============================================================================
// RAW MESSAGES
// ============================================================================

/// One message as extracted by the platform; fields may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsPdu {
    pub originating_address: Option<String>,
    pub message_body: Option<String>,
    pub timestamp_millis: i64,
}

impl SmsPdu {
    pub fn new(address: &str, body: &str, timestamp_millis: i64) -> Self {
        Self {
            originating_address: Some(address.to_string()),
            message_body: Some(body.to_string()),
            timestamp_millis,
        }
    }

    /// Missing address/body become empty strings
    pub fn into_message(self, id: String) -> Message {
        Message {
            id,
            address: self.originating_address.unwrap_or_default(),
            body: self.message_body.unwrap_or_default(),
            timestamp_millis: self.timestamp_millis,
        }
    }
}

/// One delivery: each entry is either a message or an extraction failure
pub type SmsBatch = Vec<Result<SmsPdu, PduError>>;

pub type BatchCallback = Arc<dyn Fn(SmsBatch) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceHandle(pub u64);

// ============================================================================
// SOURCE TRAIT
// ============================================================================

/// Registration with the platform's message delivery.
///
/// Implementations must not invoke the callback from inside `register`;
/// deliveries may come from any other thread at any time afterwards.
pub trait MessageSource: Send + Sync {
    fn register(&self, on_batch: BatchCallback) -> Result<SourceHandle, SourceError>;

    /// Best effort; `NotRegistered` for unknown handles
    fn unregister(&self, handle: SourceHandle) -> Result<(), SourceError>;
}

// ============================================================================
// LOCAL SOURCE
// ============================================================================

/// In-process source: whoever owns it pushes batches with `deliver`,
/// from any thread.
#[derive(Default)]
pub struct LocalMessageSource {
    receivers: Mutex<HashMap<SourceHandle, BatchCallback>>,
    next_handle: AtomicU64,
    reject_reason: Mutex<Option<String>>,
}

impl LocalMessageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make future registrations fail (None = accept again)
    pub fn reject_registrations(&self, reason: Option<&str>) {
        *self.reject_reason.lock() = reason.map(str::to_string);
    }

    pub fn registered_count(&self) -> usize {
        self.receivers.lock().len()
    }

    /// Push a batch to every registered receiver. Returns how many got it.
    pub fn deliver(&self, batch: SmsBatch) -> usize {
        // Call outside the registry lock so receivers may unregister
        let callbacks: Vec<BatchCallback> = self.receivers.lock().values().cloned().collect();

        for callback in &callbacks {
            callback(batch.clone());
        }
        callbacks.len()
    }
}

impl MessageSource for LocalMessageSource {
    fn register(&self, on_batch: BatchCallback) -> Result<SourceHandle, SourceError> {
        if let Some(reason) = self.reject_reason.lock().clone() {
            return Err(SourceError::Registration(reason));
        }

        let handle = SourceHandle(self.next_handle.fetch_add(1, Ordering::SeqCst) + 1);
        self.receivers.lock().insert(handle, on_batch);
        log::debug!("Local source: receiver {} registered", handle.0);
        Ok(handle)
    }

    fn unregister(&self, handle: SourceHandle) -> Result<(), SourceError> {
        match self.receivers.lock().remove(&handle) {
            Some(_) => {
                log::debug!("Local source: receiver {} unregistered", handle.0);
                Ok(())
            }
            None => Err(SourceError::NotRegistered(handle.0)),
        }
    }
}
