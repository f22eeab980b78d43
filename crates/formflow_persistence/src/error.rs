//! Persistence adapter error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Conversation not found: {0}")]
    NotFound(String),

    #[error("Backend responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid conversation data: {0}")]
    InvalidData(String),
}

impl AdapterError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AdapterError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, AdapterError>;
