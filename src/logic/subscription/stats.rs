//! Pipeline Statistics

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::logic::alert::DispatchOutcome;

#[derive(Debug, Default)]
pub struct PipelineStats {
    messages_delivered: AtomicU64,
    parse_errors: AtomicU64,
    frauds_detected: AtomicU64,
    alerts_presented: AtomicU64,
    dispatch_failures: AtomicU64,
    messages_dropped: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub messages_delivered: u64,
    pub parse_errors: u64,
    pub frauds_detected: u64,
    pub alerts_presented: u64,
    pub dispatch_failures: u64,
    pub messages_dropped: u64,
}

impl PipelineStats {
    pub(crate) fn message_delivered(&self) {
        self.messages_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn parse_error(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn fraud_detected(&self) {
        self.frauds_detected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn dropped(&self, count: usize) {
        self.messages_dropped.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn dispatched(&self, outcome: DispatchOutcome) {
        if outcome.presented {
            self.alerts_presented.fetch_add(1, Ordering::Relaxed);
        }
        self.dispatch_failures.fetch_add(outcome.failures(), Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            messages_delivered: self.messages_delivered.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
            frauds_detected: self.frauds_detected.load(Ordering::Relaxed),
            alerts_presented: self.alerts_presented.load(Ordering::Relaxed),
            dispatch_failures: self.dispatch_failures.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
        }
    }
}
