use formflow_core::PatchError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("edit could not be applied: {0}")]
    Patch(#[from] PatchError),

    #[error("no current step, the conversation is complete")]
    NoCurrentStep,

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("history of conversation {id} cannot be replayed: {source}")]
    InvalidHistory {
        id: String,
        #[source]
        source: PatchError,
    },

    #[error("no persistence adapter configured")]
    NoAdapter,
}

pub type Result<T> = std::result::Result<T, EngineError>;
