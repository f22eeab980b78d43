use thiserror::Error;

/// Failure of a single action invocation.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("action not registered: {0}")]
    NotRegistered(String),

    #[error("invalid input for action: {0}")]
    InvalidInput(String),

    #[error("action failed: {0}")]
    Failed(String),

    #[error("action '{action}' panicked: {message}")]
    Panicked { action: String, message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("action with name '{0}' already registered")]
    DuplicateAction(String),

    #[error("invalid action: {0}")]
    InvalidAction(String),
}

pub type Result<T> = std::result::Result<T, ActionError>;
