//! Alert Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{ALERT_CHANNEL_ID, ALERT_CHANNEL_NAME, EXCERPT_ELLIPSIS, FRAUD_ALERT_SLOT_ID};

// ============================================================================
// SLOT
// ============================================================================

/// Identifier of a presentation slot. Only one exists for fraud alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotId(pub u32);

impl SlotId {
    pub const FRAUD_ALERT: SlotId = SlotId(FRAUD_ALERT_SLOT_ID);
}

/// Presentation channel the alert is posted on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertChannel {
    pub id: String,
    pub name: String,
    pub description: String,
    pub high_importance: bool,
}

impl Default for AlertChannel {
    fn default() -> Self {
        Self {
            id: ALERT_CHANNEL_ID.to_string(),
            name: ALERT_CHANNEL_NAME.to_string(),
            description: "Notifications for detected SMS fraud attempts".to_string(),
            high_importance: true,
        }
    }
}

// ============================================================================
// ACTIONS
// ============================================================================

/// Payload handed back to the UI when the user opens an alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDetailsPayload {
    pub fraud_alert: bool,
    pub phone_number: String,
    pub message: String,
}

/// Follow-up actions attached to an alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertAction {
    ViewDetails { payload: ViewDetailsPayload },
    BlockSender { phone_number: String, request_code: u32 },
}

impl AlertAction {
    pub fn view_details(phone_number: &str, message: &str) -> Self {
        AlertAction::ViewDetails {
            payload: ViewDetailsPayload {
                fraud_alert: true,
                phone_number: phone_number.to_string(),
                message: message.to_string(),
            },
        }
    }

    /// Request code is a stable hash of the number so each sender gets its own handle
    pub fn block_sender(phone_number: &str) -> Self {
        AlertAction::BlockSender {
            phone_number: phone_number.to_string(),
            request_code: crc32fast::hash(phone_number.as_bytes()),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AlertAction::ViewDetails { .. } => "View Details",
            AlertAction::BlockSender { .. } => "Block Sender",
        }
    }
}

/// What the foreground-wake collaborator is asked to do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WakeRequest {
    /// Bring the UI forward (`wake_up`)
    Resume,
    /// Open the UI on a specific alert
    ShowAlert(ViewDetailsPayload),
}

// ============================================================================
// ALERT RECORD
// ============================================================================

/// A fraud alert ready to be presented
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub phone_number: String,
    pub message_excerpt: String,
    pub threat_type: String,
    pub slot_id: SlotId,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub actions: Vec<AlertAction>,
    pub posted_at: DateTime<Utc>,
}

impl AlertRecord {
    pub fn build(phone_number: &str, message: &str, threat_type: &str, excerpt_max_chars: usize) -> Self {
        let excerpt = excerpt(message, excerpt_max_chars);

        Self {
            title: format!("🚨 {} Detected!", threat_type),
            summary: format!("From: {}", phone_number),
            body: format!("Suspicious message from {}:\n\n{}", phone_number, excerpt),
            actions: vec![
                AlertAction::view_details(phone_number, message),
                AlertAction::block_sender(phone_number),
            ],
            phone_number: phone_number.to_string(),
            message_excerpt: excerpt,
            threat_type: threat_type.to_string(),
            slot_id: SlotId::FRAUD_ALERT,
            posted_at: Utc::now(),
        }
    }
}

/// First `max_chars` characters, with an ellipsis only if something was cut
pub fn excerpt(message: &str, max_chars: usize) -> String {
    match message.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &message[..cut], EXCERPT_ELLIPSIS),
        None => message.to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
