//! # formflow persistence
//!
//! The adapter contract the conversation engine mirrors its history through,
//! plus three adapters: HTTP (talks to the backend server), in-memory and
//! JSON files on disk.

pub mod adapter;
pub mod config;
pub mod error;
pub mod file;
pub mod http;
pub mod memory;
pub mod models;

// Re-exports
pub use adapter::PersistenceAdapter;
pub use config::AdapterConfig;
pub use error::{AdapterError, Result};
pub use file::FilePersistenceAdapter;
pub use http::HttpPersistenceAdapter;
pub use memory::InMemoryPersistenceAdapter;
pub use models::{
    ConversationHandle, ConversationRecord, ConversationSummary, StateSnapshot, StepAppend,
    StoredConversation,
};
