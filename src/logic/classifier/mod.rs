//! Classifier Module
//!
//! Heuristic fraud check on a message body.
//!
//! ## Structure
//! - `types`: ClassificationResult
//! - `rules`: ordered fraud phrase list
//! - `classifier`: matching logic
//!
//! ## Usage
//! ```ignore
//! use crate::logic::classifier::classify;
//!
//! let result = classify("Your momo has been blocked");
//! if result.is_fraud {
//!     println!("matched: {:?}", result.matched_pattern);
//! }
//! ```

pub mod types;
pub mod rules;
#[allow(clippy::module_inception)]
pub mod classifier;

pub use types::ClassificationResult;
pub use rules::FRAUD_PATTERNS;
pub use classifier::{classify, is_likely_fraud, FraudClassifier};
