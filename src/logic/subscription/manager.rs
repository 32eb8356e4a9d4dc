//! Subscription Manager
//!
//! Owns the at-most-one listening session and bridges the push-based
//! source into a single output sink.
//!
//! State: `Idle` -> `Listening` on `start`, back to `Idle` on `stop` or drop.
//!
//! Sink, registration handle and generation form one unit behind one mutex.
//! Every delivery callback carries the generation it was registered under;
//! `stop` bumps the generation, so a callback still in flight stops at the
//! next message of its batch (the rest of the batch is dropped).
//!
//! Alert dispatch runs outside the lock. An alert that passed its generation
//! check before `stop` may still be presented (and wake the UI) after `stop`
//! returns; at most one per in-flight batch, never a new one.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

use super::sink::MessageSink;
use super::source::{BatchCallback, MessageSource, SmsBatch, SourceHandle};
use super::stats::{PipelineStats, StatsSnapshot};
use crate::logic::alert::AlertDispatcher;
use crate::logic::classifier::FraudClassifier;
use crate::logic::error::{ShieldError, SourceError};
use crate::logic::message::{next_arrival_id, Message};
use crate::logic::permission::PermissionGate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubscriptionState {
    Idle,
    Listening,
}

// ============================================================================
// SHARED STATE
// ============================================================================

#[derive(Default)]
struct ListenerState {
    sink: Option<Arc<dyn MessageSink>>,
    handle: Option<SourceHandle>,
    generation: u64,
    session: Option<Uuid>,
}

impl ListenerState {
    /// Sink to deliver to, if `generation` is still the live registration
    fn active_sink(&self, generation: u64) -> Option<Arc<dyn MessageSink>> {
        if self.generation == generation && self.handle.is_some() {
            self.sink.clone()
        } else {
            None
        }
    }
}

/// Everything a delivery callback needs
struct Pipeline {
    state: Mutex<ListenerState>,
    classifier: FraudClassifier,
    dispatcher: Arc<AlertDispatcher>,
    stats: PipelineStats,
}

impl Pipeline {
    fn is_current(&self, generation: u64) -> bool {
        self.state.lock().active_sink(generation).is_some()
    }

    fn deliver(&self, generation: u64, batch: SmsBatch) {
        let total = batch.len();

        for (index, item) in batch.into_iter().enumerate() {
            let message = {
                let state = self.state.lock();
                let Some(sink) = state.active_sink(generation) else {
                    self.drop_rest(total - index);
                    return;
                };

                match item {
                    Ok(pdu) => {
                        let message = pdu.into_message(next_arrival_id());
                        sink.on_message(&message);
                        self.stats.message_delivered();
                        message
                    }
                    Err(e) => {
                        log::warn!("Failed to parse SMS {}/{}: {}", index + 1, total, e);
                        let err = ShieldError::Parse(e.0);
                        sink.on_error(err.code(), &err.to_string());
                        self.stats.parse_error();
                        continue;
                    }
                }
            };

            self.screen(generation, &message, total - index);
        }
    }

    /// Classify one message and alert on it. Returns early (dropping the
    /// remaining `left` messages of the batch) if the session ended meanwhile.
    fn screen(&self, generation: u64, message: &Message, left: usize) {
        let result = self.classifier.classify(&message.body);
        if !result.is_fraud {
            return;
        }

        self.stats.fraud_detected();
        log::warn!(
            "Fraud pattern '{}' in message from {}",
            result.matched_pattern.as_deref().unwrap_or_default(),
            message.display_sender()
        );

        if !self.is_current(generation) {
            log::debug!("Session ended before alert dispatch, alert skipped");
            self.drop_rest(left.saturating_sub(1));
            return;
        }

        let outcome = self.dispatcher.notify_fraud(message, &result);
        self.stats.dispatched(outcome);
    }

    fn drop_rest(&self, count: usize) {
        if count > 0 {
            log::debug!("Listener stopped mid-batch, dropping {} message(s)", count);
            self.stats.dropped(count);
        }
    }
}

// ============================================================================
// MANAGER
// ============================================================================

pub struct SubscriptionManager {
    source: Arc<dyn MessageSource>,
    permissions: Arc<dyn PermissionGate>,
    pipeline: Arc<Pipeline>,
}

impl SubscriptionManager {
    pub fn new(
        source: Arc<dyn MessageSource>,
        permissions: Arc<dyn PermissionGate>,
        dispatcher: Arc<AlertDispatcher>,
        classifier: FraudClassifier,
    ) -> Self {
        Self {
            source,
            permissions,
            pipeline: Arc::new(Pipeline {
                state: Mutex::new(ListenerState::default()),
                classifier,
                dispatcher,
                stats: PipelineStats::default(),
            }),
        }
    }

    pub fn state(&self) -> SubscriptionState {
        if self.pipeline.state.lock().handle.is_some() {
            SubscriptionState::Listening
        } else {
            SubscriptionState::Idle
        }
    }

    pub fn is_listening(&self) -> bool {
        self.state() == SubscriptionState::Listening
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.pipeline.stats.snapshot()
    }

    pub fn dispatcher(&self) -> &Arc<AlertDispatcher> {
        &self.pipeline.dispatcher
    }

    /// Start listening and route messages to `sink`.
    ///
    /// While already listening the new sink supersedes the old one and the
    /// existing source registration is kept.
    pub fn start(&self, sink: Arc<dyn MessageSink>) -> Result<(), ShieldError> {
        if !self.permissions.sms_permitted() {
            log::warn!("SMS listener not started: permissions not granted");
            return Err(ShieldError::PermissionDenied);
        }

        let mut state = self.pipeline.state.lock();

        if state.handle.is_some() {
            state.sink = Some(sink);
            log::info!(
                "SMS subscription superseded (session {})",
                state.session.map(|s| s.to_string()).unwrap_or_default()
            );
            return Ok(());
        }

        state.generation = state.generation.wrapping_add(1);
        let generation = state.generation;

        let pipeline: Weak<Pipeline> = Arc::downgrade(&self.pipeline);
        let callback: BatchCallback = Arc::new(move |batch: SmsBatch| {
            if let Some(pipeline) = pipeline.upgrade() {
                pipeline.deliver(generation, batch);
            }
        });

        match self.source.register(callback) {
            Ok(handle) => {
                let session = Uuid::new_v4();
                state.handle = Some(handle);
                state.sink = Some(sink);
                state.session = Some(session);
                log::info!("SMS listener started (session {})", session);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to start SMS listener: {}", e);
                Err(ShieldError::ListenerStart(e.to_string()))
            }
        }
    }

    /// Stop listening. No-op when idle; never fails.
    ///
    /// Does not wait for an alert already being dispatched, so it is safe to
    /// call from a presenter or waker.
    pub fn stop(&self) {
        let (handle, sink, session) = {
            let mut state = self.pipeline.state.lock();
            state.generation = state.generation.wrapping_add(1);
            (state.handle.take(), state.sink.take(), state.session.take())
        };
        drop(sink);

        let Some(handle) = handle else {
            log::debug!("Stop requested while idle");
            return;
        };

        match self.source.unregister(handle) {
            Ok(()) => {}
            Err(SourceError::NotRegistered(_)) => {
                log::debug!("Receiver {} was not registered", handle.0)
            }
            Err(e) => log::warn!("Failed to unregister receiver {}: {}", handle.0, e),
        }

        log::info!(
            "SMS listener stopped (session {})",
            session.map(|s| s.to_string()).unwrap_or_default()
        );
    }
}

impl Drop for SubscriptionManager {
    fn drop(&mut self) {
        self.stop();
    }
}
