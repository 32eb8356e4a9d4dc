//! Fraud Phrase Rules
//!
//! Constants only. Order matters: the first phrase found wins.

/// Known mobile-money scam phrases, lowercase, in priority order
pub const FRAUD_PATTERNS: &[&str] = &[
    "send your momo pin",
    "your momo has been blocked",
    "urgent money needed",
    "cash-out",
    "reset your account",
    "unlock bonus",
    "you won",
    "verify your pin",
    "account suspended",
    "immediate payment",
];
