//! formflow_engine - Conversation step engine
//!
//! Owns the initial document, the committed step history, the FIFO queue of
//! steps injected by actions and the session-state bag. Local state is
//! authoritative; an optional persistence adapter is kept in sync by a
//! background mirror task.

pub mod catalog;
pub mod config;
pub mod conversation;
pub mod engine;
pub mod error;
pub mod observer;
pub mod store;
mod sync;

// Re-export commonly used types
pub use catalog::StepCatalog;
pub use config::EngineConfig;
pub use conversation::{Conversation, ConversationPhase, StepCursor};
pub use engine::{ConversationEngine, Submission};
pub use error::{EngineError, Result};
pub use observer::CommitObserver;
pub use store::DocumentStore;
