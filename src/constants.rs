//! Central Configuration Constants
//!
//! Single source of truth for channel names, error codes and defaults.
//! Runtime overrides live in `logic::config`.

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "MoMo Shield";

// ============================================
// Channels & methods
// ============================================

/// Method channel for message queries
pub const SMS_CHANNEL: &str = "momoshield/sms";

/// Event channel carrying the live message stream
pub const SMS_STREAM_CHANNEL: &str = "momoshield/sms_stream";

/// Method channel for alerts and wake requests
pub const NOTIFICATION_CHANNEL: &str = "momoshield/notifications";

pub const METHOD_GET_RECENT_MESSAGES: &str = "getRecentMessages";
pub const METHOD_SHOW_FRAUD_ALERT: &str = "showFraudAlert";
pub const METHOD_WAKE_UP_APP: &str = "wakeUpApp";

// ============================================
// Error codes (cross the API boundary verbatim)
// ============================================

pub const ERR_PERMISSION_DENIED: &str = "PERMISSION_DENIED";
pub const ERR_SMS_PARSE: &str = "SMS_PARSE_ERROR";
pub const ERR_LISTENER_START: &str = "LISTENER_START_ERROR";

// ============================================
// Alert presentation
// ============================================

/// The single presentation slot every fraud alert is written to
pub const FRAUD_ALERT_SLOT_ID: u32 = 1001;

/// Presentation channel id for fraud alerts
pub const ALERT_CHANNEL_ID: &str = "MOMOSHIELD_FRAUD_ALERTS";

/// Human readable presentation channel name
pub const ALERT_CHANNEL_NAME: &str = "Fraud Alerts";

/// Label used for fraud detected on the live stream
pub const DEFAULT_STREAM_THREAT_LABEL: &str = "SCAM";

/// Excerpt length (characters) before an ellipsis is appended
pub const DEFAULT_EXCERPT_MAX_CHARS: usize = 100;

pub const EXCERPT_ELLIPSIS: &str = "...";

/// Sender shown on alerts when the message carries no address
pub const UNKNOWN_SENDER: &str = "Unknown";

/// Repeated wake requests inside this window collapse into one
pub const DEFAULT_WAKE_COALESCE_MS: u64 = 1_000;

// ============================================
// Query
// ============================================

/// Limit used when a query does not specify one
pub const DEFAULT_QUERY_LIMIT: usize = 100;

/// Table holding the inbox in the SQLite store
pub const INBOX_TABLE: &str = "sms_inbox";

// ============================================
// Environment
// ============================================

pub const ENV_CONFIG_PATH: &str = "MOMOSHIELD_CONFIG";
pub const ENV_QUERY_LIMIT: &str = "MOMOSHIELD_QUERY_LIMIT";
pub const ENV_THREAT_LABEL: &str = "MOMOSHIELD_THREAT_LABEL";
pub const ENV_WAKE_COALESCE_MS: &str = "MOMOSHIELD_WAKE_COALESCE_MS";
pub const ENV_INBOX_DB: &str = "MOMOSHIELD_INBOX_DB";
pub const ENV_LOG_LEVEL: &str = "MOMOSHIELD_LOG_LEVEL";

/// Read a parseable value from the environment, `None` if unset or invalid
pub fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// Read a non-empty string from the environment
pub fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
