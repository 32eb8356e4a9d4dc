//! Alert Collaborators
//!
//! Seams to the platform: putting an alert on screen, bringing the UI
//! forward, and blocking a sender. Shipped implementations only log.

use super::types::{AlertChannel, AlertRecord, SlotId, WakeRequest};
use crate::logic::error::DispatchError;

/// Shows an alert in a presentation slot, replacing what the slot held
pub trait AlertPresenter: Send + Sync {
    fn present(&self, channel: &AlertChannel, slot: SlotId, alert: &AlertRecord) -> Result<(), DispatchError>;
}

/// Brings the UI to the foreground
pub trait ForegroundWaker: Send + Sync {
    fn wake(&self, request: &WakeRequest) -> Result<(), DispatchError>;
}

/// Persists a block on a sender
pub trait SenderBlocker: Send + Sync {
    fn block_sender(&self, phone_number: &str) -> Result<(), DispatchError>;
}

// ============================================================================
// LOG-ONLY IMPLEMENTATIONS
// ============================================================================

/// Writes alerts to the log instead of an OS notification
#[derive(Debug, Default)]
pub struct LogPresenter;

impl AlertPresenter for LogPresenter {
    fn present(&self, channel: &AlertChannel, slot: SlotId, alert: &AlertRecord) -> Result<(), DispatchError> {
        log::warn!(
            "[{}#{}] {} | {} | {}",
            channel.id,
            slot.0,
            alert.title,
            alert.summary,
            alert.message_excerpt
        );
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct LogWaker;

impl ForegroundWaker for LogWaker {
    fn wake(&self, request: &WakeRequest) -> Result<(), DispatchError> {
        match request {
            WakeRequest::Resume => log::info!("Foreground wake requested"),
            WakeRequest::ShowAlert(payload) => {
                log::info!("Foreground wake requested for alert from {}", payload.phone_number)
            }
        }
        Ok(())
    }
}

/// Sender blocking is not implemented yet: requests are logged and acknowledged.
// TODO: persist blocked senders once the platform block-list API is wired in
#[derive(Debug, Default)]
pub struct UnimplementedBlocker;

impl SenderBlocker for UnimplementedBlocker {
    fn block_sender(&self, phone_number: &str) -> Result<(), DispatchError> {
        log::info!("Block sender requested for: {} (blocking not implemented)", phone_number);
        Ok(())
    }
}
