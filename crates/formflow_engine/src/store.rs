use async_trait::async_trait;
use formflow_core::Operation;
use serde_json::Value;

use crate::error::Result;

/// What the rendering layer sees of the engine.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Owned copy of the current document.
    async fn get_doc(&self) -> Value;

    /// Commit `ops` as the current step and return the new document. Empty
    /// `ops` return the current document without recording a step.
    async fn apply_patch(&self, ops: Vec<Operation>) -> Result<Value>;
}
