//! Query Service
//!
//! Permission-gated read of recent messages. A failing store yields an
//! empty list, not an error; only missing permissions reach the caller.

use std::sync::Arc;

use super::store::MessageStore;
use crate::constants::DEFAULT_QUERY_LIMIT;
use crate::logic::error::ShieldError;
use crate::logic::message::Message;
use crate::logic::permission::PermissionGate;

pub struct QueryService {
    store: Arc<dyn MessageStore>,
    permissions: Arc<dyn PermissionGate>,
    default_limit: usize,
}

impl QueryService {
    pub fn new(store: Arc<dyn MessageStore>, permissions: Arc<dyn PermissionGate>) -> Self {
        Self {
            store,
            permissions,
            default_limit: DEFAULT_QUERY_LIMIT,
        }
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Newest-first messages, at most `limit` (default when `None`,
    /// zero or negative gives an empty list).
    pub fn get_recent_messages(&self, limit: Option<i64>) -> Result<Vec<Message>, ShieldError> {
        if !self.permissions.sms_permitted() {
            log::warn!("Recent messages requested without SMS permissions");
            return Err(ShieldError::PermissionDenied);
        }

        let limit = match limit {
            None => self.default_limit,
            Some(n) if n <= 0 => 0,
            Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
        };
        if limit == 0 {
            return Ok(Vec::new());
        }

        let records = match self.store.read_recent(limit) {
            Ok(records) => records,
            Err(e) => {
                log::warn!("Failed to read SMS inbox, returning no messages: {}", e);
                return Ok(Vec::new());
            }
        };

        let mut messages: Vec<Message> = records.into_iter().map(|r| r.into_message()).collect();
        messages.sort_by(|a, b| b.timestamp_millis.cmp(&a.timestamp_millis));
        messages.truncate(limit);

        log::debug!("Read {} recent message(s) (limit {})", messages.len(), limit);
        Ok(messages)
    }
}
