//! Fraud Classifier
//!
//! Matching logic only - phrases live in `rules`.
//! Input: message body
//! Output: ClassificationResult
//!
//! Pure and deterministic: no I/O, never fails, any string is valid input.

use once_cell::sync::Lazy;

use super::rules::FRAUD_PATTERNS;
use super::types::ClassificationResult;
use crate::constants::DEFAULT_STREAM_THREAT_LABEL;

static DEFAULT_CLASSIFIER: Lazy<FraudClassifier> = Lazy::new(FraudClassifier::new);

/// Case-insensitive substring matcher over an ordered phrase list
#[derive(Debug, Clone)]
pub struct FraudClassifier {
    patterns: Vec<String>,
    threat_label: String,
}

impl Default for FraudClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl FraudClassifier {
    /// Built-in phrase list, "SCAM" label
    pub fn new() -> Self {
        Self::with_patterns(FRAUD_PATTERNS.iter().copied())
    }

    /// Custom ordered phrase list; phrases are folded to lowercase
    pub fn with_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
            threat_label: DEFAULT_STREAM_THREAT_LABEL.to_string(),
        }
    }

    /// Label reported as `threat_type` on a match
    pub fn with_threat_label(mut self, label: impl Into<String>) -> Self {
        self.threat_label = label.into();
        self
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn threat_label(&self) -> &str {
        &self.threat_label
    }

    pub fn classify(&self, body: &str) -> ClassificationResult {
        let folded = body.to_lowercase();

        self.patterns
            .iter()
            .find(|pattern| folded.contains(pattern.as_str()))
            .map(|pattern| ClassificationResult::fraud(pattern, &self.threat_label))
            .unwrap_or_else(ClassificationResult::clean)
    }
}

/// Classify with the built-in phrase list
pub fn classify(body: &str) -> ClassificationResult {
    DEFAULT_CLASSIFIER.classify(body)
}

/// Quick yes/no check
pub fn is_likely_fraud(body: &str) -> bool {
    classify(body).is_fraud
}

// ============================================================================
// TESTS
// ============================================================================
