//! Subscription Module - Live SMS Stream
//!
//! ## Structure
//! - `source`: MessageSource seam (register/unregister) + LocalMessageSource
//! - `sink`: MessageSink seam + channel / closure sinks
//! - `stats`: pipeline counters
//! - `manager`: SubscriptionManager (permission gate, delivery, classify, alert)
//!
//! ## Usage
//! ```ignore
//! let (sink, mut stream) = ChannelSink::new();
//! manager.start(Arc::new(sink))?;
//! while let Some(event) = stream.next().await { /* ... */ }
//! manager.stop();
//! ```

pub mod source;
pub mod sink;
pub mod stats;
pub mod manager;

#[cfg(test)]
mod tests;

pub use source::{BatchCallback, LocalMessageSource, MessageSource, SmsBatch, SmsPdu, SourceHandle};
pub use sink::{ChannelSink, EventStream, FnSink, MessageSink, StreamEvent};
pub use stats::{PipelineStats, StatsSnapshot};
pub use manager::{SubscriptionManager, SubscriptionState};
