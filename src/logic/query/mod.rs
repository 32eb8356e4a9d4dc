//! Query Module - Recent Message Reads
//!
//! ## Structure
//! - `store`: MessageStore seam, StoreRecord, in-memory store
//! - `sqlite`: SQLite inbox store
//! - `service`: QueryService (permission gate, limit, defaults)

pub mod store;
pub mod sqlite;
pub mod service;

pub use store::{MemoryMessageStore, MessageStore, StoreRecord};
pub use sqlite::SqliteMessageStore;
pub use service::QueryService;
