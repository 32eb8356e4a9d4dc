//! Logic Module - Fraud Monitoring Pipeline
//!
//! ## Structure
//! - `message` - Message type, arrival ids
//! - `error` - error taxonomy
//! - `config` - ShieldConfig (file + env)
//! - `permission` - permission gate
//! - `classifier/` - phrase-based fraud classifier
//! - `alert/` - alert slot, presenter/waker seams, dispatcher
//! - `subscription/` - live stream: source, sinks, manager
//! - `query/` - recent message reads (memory / SQLite)

pub mod message;
pub mod error;
pub mod config;
pub mod permission;

pub mod classifier;
pub mod alert;
pub mod subscription;
pub mod query;
