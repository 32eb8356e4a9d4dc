//! Alert Slot
//!
//! Capacity-1 register of the currently visible alert. Writing replaces
//! whatever is there (last write wins); nothing is queued.

use parking_lot::{Mutex, MutexGuard};

use super::types::{AlertRecord, SlotId};

pub struct AlertSlot {
    id: SlotId,
    current: Mutex<Option<AlertRecord>>,
}

impl AlertSlot {
    pub fn new(id: SlotId) -> Self {
        Self {
            id,
            current: Mutex::new(None),
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    /// Alert currently shown, if any
    pub fn current(&self) -> Option<AlertRecord> {
        self.current.lock().clone()
    }

    pub fn is_occupied(&self) -> bool {
        self.current.lock().is_some()
    }

    /// Dismiss the visible alert
    pub fn clear(&self) -> Option<AlertRecord> {
        self.current.lock().take()
    }

    /// Hold the slot while presenting so the register and what is on screen
    /// change together
    pub(crate) fn lock(&self) -> SlotGuard<'_> {
        SlotGuard {
            inner: self.current.lock(),
        }
    }
}

impl Default for AlertSlot {
    fn default() -> Self {
        Self::new(SlotId::FRAUD_ALERT)
    }
}

pub(crate) struct SlotGuard<'a> {
    inner: MutexGuard<'a, Option<AlertRecord>>,
}

impl SlotGuard<'_> {
    /// Overwrite, returning the replaced alert
    pub(crate) fn replace(&mut self, record: AlertRecord) -> Option<AlertRecord> {
        self.inner.replace(record)
    }
}
