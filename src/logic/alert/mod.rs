//! Alert Module - Fraud Alert Presentation
//!
//! # Components
//! - `types.rs`: AlertRecord, actions, wake requests
//! - `slot.rs`: single visible-alert register
//! - `collaborators.rs`: presenter / waker / blocker seams + log-only impls
//! - `dispatcher.rs`: AlertDispatcher

pub mod types;
pub mod slot;
pub mod collaborators;
pub mod dispatcher;

pub use types::{
    excerpt, AlertAction, AlertChannel, AlertRecord, SlotId, ViewDetailsPayload, WakeRequest,
};
pub use slot::AlertSlot;
pub use collaborators::{
    AlertPresenter, ForegroundWaker, LogPresenter, LogWaker, SenderBlocker, UnimplementedBlocker,
};
pub use dispatcher::{AlertDispatcher, DispatchOutcome};
