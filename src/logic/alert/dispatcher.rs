//! Alert Dispatcher
//!
//! Turns a fraud classification into a visible alert and a foreground wake.
//!
//! Rules:
//! - every alert goes to the one fraud slot; a new alert replaces the old one
//! - repeated wake requests inside the coalesce window cause one wake
//! - from the pipeline's side everything is fire-and-forget (`notify_fraud`)

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::collaborators::{AlertPresenter, ForegroundWaker, SenderBlocker, UnimplementedBlocker};
use super::slot::AlertSlot;
use super::types::{AlertAction, AlertChannel, AlertRecord, WakeRequest};
use crate::constants::{DEFAULT_EXCERPT_MAX_CHARS, DEFAULT_WAKE_COALESCE_MS};
use crate::logic::classifier::ClassificationResult;
use crate::logic::config::ShieldConfig;
use crate::logic::error::DispatchError;
use crate::logic::message::Message;

/// What happened when the pipeline handed a fraud message over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub presented: bool,
    pub woke: bool,
}

impl DispatchOutcome {
    pub fn failures(&self) -> u64 {
        (!self.presented) as u64 + (!self.woke) as u64
    }
}

pub struct AlertDispatcher {
    channel: AlertChannel,
    slot: AlertSlot,
    presenter: Arc<dyn AlertPresenter>,
    waker: Arc<dyn ForegroundWaker>,
    blocker: Arc<dyn SenderBlocker>,
    excerpt_max_chars: usize,
    wake_coalesce: Duration,
    last_wake: Mutex<Option<Instant>>,
}

impl AlertDispatcher {
    pub fn new(presenter: Arc<dyn AlertPresenter>, waker: Arc<dyn ForegroundWaker>) -> Self {
        Self {
            channel: AlertChannel::default(),
            slot: AlertSlot::default(),
            presenter,
            waker,
            blocker: Arc::new(UnimplementedBlocker),
            excerpt_max_chars: DEFAULT_EXCERPT_MAX_CHARS,
            wake_coalesce: Duration::from_millis(DEFAULT_WAKE_COALESCE_MS),
            last_wake: Mutex::new(None),
        }
    }

    pub fn with_blocker(mut self, blocker: Arc<dyn SenderBlocker>) -> Self {
        self.blocker = blocker;
        self
    }

    pub fn with_config(mut self, config: &ShieldConfig) -> Self {
        self.excerpt_max_chars = config.excerpt_max_chars;
        self.wake_coalesce = Duration::from_millis(config.wake_coalesce_ms);
        self
    }

    pub fn with_wake_coalesce(mut self, window: Duration) -> Self {
        self.wake_coalesce = window;
        self
    }

    // ========================================================================
    // PRESENTATION
    // ========================================================================

    /// Build an alert and show it in the fraud slot, replacing any visible one.
    /// On failure the slot keeps its previous content.
    pub fn present_alert(&self, phone_number: &str, message: &str, threat_type: &str) -> Result<AlertRecord, DispatchError> {
        let record = AlertRecord::build(phone_number, message, threat_type, self.excerpt_max_chars);

        let mut slot = self.slot.lock();
        self.presenter.present(&self.channel, self.slot.id(), &record)?;
        if slot.replace(record.clone()).is_some() {
            log::debug!("Fraud alert slot {} overwritten", self.slot.id().0);
        }

        log::info!("Presented {} alert for {}", record.threat_type, record.phone_number);
        Ok(record)
    }

    /// Alert currently visible in the fraud slot
    pub fn current_alert(&self) -> Option<AlertRecord> {
        self.slot.current()
    }

    pub fn dismiss(&self) -> Option<AlertRecord> {
        self.slot.clear()
    }

    pub fn channel(&self) -> &AlertChannel {
        &self.channel
    }

    // ========================================================================
    // WAKE
    // ========================================================================

    /// Ask for the UI to come forward. Safe to call in bursts: calls within
    /// the coalesce window of the last successful wake are absorbed.
    pub fn request_foreground_wake(&self) -> Result<(), DispatchError> {
        let mut last = self.last_wake.lock();

        if let Some(at) = *last {
            if at.elapsed() < self.wake_coalesce {
                log::debug!("Foreground wake coalesced ({}ms since last)", at.elapsed().as_millis());
                return Ok(());
            }
        }

        self.waker.wake(&WakeRequest::Resume)?;
        *last = Some(Instant::now());
        Ok(())
    }

    // ========================================================================
    // ACTIONS
    // ========================================================================

    /// Run a user-triggered alert action
    pub fn handle_action(&self, action: &AlertAction) -> Result<(), DispatchError> {
        match action {
            AlertAction::ViewDetails { payload } => {
                self.waker.wake(&WakeRequest::ShowAlert(payload.clone()))
            }
            AlertAction::BlockSender { phone_number, .. } => self.blocker.block_sender(phone_number),
        }
    }

    // ========================================================================
    // PIPELINE ENTRY
    // ========================================================================

    /// Alert on a fraud-positive message. Never fails: errors are logged and
    /// reported in the outcome only.
    pub fn notify_fraud(&self, message: &Message, result: &ClassificationResult) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();

        match self.present_alert(message.display_sender(), &message.body, &result.threat_type) {
            Ok(_) => outcome.presented = true,
            Err(e) => log::error!("Failed to present fraud alert for {}: {}", message.display_sender(), e),
        }

        match self.request_foreground_wake() {
            Ok(()) => outcome.woke = true,
            Err(e) => log::error!("Failed to wake app: {}", e),
        }

        outcome
    }
}

// ============================================================================
// TESTS
// ============================================================================
