//! MoMo Shield Core
//!
//! Watches incoming SMS for mobile-money scam phrases, streams every
//! message to a subscriber and raises a single replaceable alert on fraud.

pub mod constants;
pub mod logic;
pub mod api;

pub use api::{MethodResponse, ShieldService};
pub use logic::config::ShieldConfig;
pub use logic::error::ShieldError;
pub use logic::message::Message;
