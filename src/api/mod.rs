//! API Module
//!
//! Structure:
//! - commands.rs: ShieldService, method routing and stream subscribe/cancel
//!
//! Usage:
//! - `api::ShieldService::handle_call(SMS_CHANNEL, "getRecentMessages", &args)`

pub mod commands;

pub use commands::*;
