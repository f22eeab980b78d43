//! Persistence adapter trait

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::models::{
    ConversationHandle, ConversationRecord, ConversationSummary, StateSnapshot, StepAppend,
};

/// Remote (or local) store of conversation history.
///
/// Every call is independently failable. The engine treats writes as best
/// effort; only `load` and `list` are awaited on behalf of the user.
#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    /// Create a record. A missing title is replaced by a generated one.
    async fn create(&self, title: Option<&str>, initial: &Value) -> Result<ConversationHandle>;

    /// All conversations, most recently updated first.
    async fn list(&self) -> Result<Vec<ConversationSummary>>;

    async fn load(&self, id: &str) -> Result<ConversationRecord>;

    async fn rename(&self, id: &str, title: &str) -> Result<()>;

    async fn append_step(&self, id: &str, step: &StepAppend) -> Result<()>;

    /// Remove the most recently appended step.
    async fn undo(&self, id: &str) -> Result<()>;

    /// Overwrite pending steps and session state.
    async fn save_state(&self, id: &str, state: &StateSnapshot) -> Result<()>;

    /// Drop every step, keeping the initial document.
    async fn reset(&self, id: &str) -> Result<()>;

    /// Check that the store is reachable.
    async fn health(&self) -> Result<()> {
        Ok(())
    }
}
