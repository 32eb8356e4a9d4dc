//! Classifier Types
//!
//! Data structures only, no matching logic.

use serde::{Deserialize, Serialize};

/// Outcome of classifying one message body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub is_fraud: bool,
    /// First pattern (in list order) found in the body
    pub matched_pattern: Option<String>,
    /// Empty when the message is clean
    pub threat_type: String,
}

impl ClassificationResult {
    pub fn clean() -> Self {
        Self::default()
    }

    pub fn fraud(pattern: &str, threat_type: &str) -> Self {
        Self {
            is_fraud: true,
            matched_pattern: Some(pattern.to_string()),
            threat_type: threat_type.to_string(),
        }
    }
}
