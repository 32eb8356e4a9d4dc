//! Error Taxonomy
//!
//! Only permission and listener-registration failures cross the pipeline
//! boundary. Parse errors are per message, dispatch and store failures are
//! absorbed where they happen and show up in logs and stats.

use std::path::PathBuf;

use thiserror::Error;

use crate::constants::{ERR_LISTENER_START, ERR_PERMISSION_DENIED, ERR_SMS_PARSE};

/// Errors surfaced to callers of the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShieldError {
    #[error("SMS permissions not granted")]
    PermissionDenied,

    #[error("failed to start SMS listener: {0}")]
    ListenerStart(String),

    #[error("failed to parse SMS: {0}")]
    Parse(String),
}

impl ShieldError {
    /// Wire code used on the request surface and the stream error channel
    pub fn code(&self) -> &'static str {
        match self {
            ShieldError::PermissionDenied => ERR_PERMISSION_DENIED,
            ShieldError::ListenerStart(_) => ERR_LISTENER_START,
            ShieldError::Parse(_) => ERR_SMS_PARSE,
        }
    }
}

/// Alert presentation or wake request failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("alert presentation failed: {0}")]
    Presentation(String),

    #[error("foreground wake failed: {0}")]
    Wake(String),
}

/// Message store read failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("message store unavailable: {0}")]
    Unavailable(String),

    #[error("message store query failed: {0}")]
    Query(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Query(err.to_string())
    }
}

/// Config file could not be used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("failed to parse config {path:?}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// Message source registration failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("source registration failed: {0}")]
    Registration(String),

    #[error("handle {0} is not registered")]
    NotRegistered(u64),
}

/// A single message in a delivered batch could not be extracted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PduError(pub String);
