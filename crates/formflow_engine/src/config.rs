use chrono::{DateTime, Utc};

pub const DEFAULT_TITLE_PREFIX: &str = "Conversation";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Prefix of titles generated for conversations created without one.
    pub title_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title_prefix: DEFAULT_TITLE_PREFIX.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn with_title_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.title_prefix = prefix.into();
        self
    }

    pub fn generated_title(&self, at: DateTime<Utc>) -> String {
        format!("{} {}", self.title_prefix, at.format("%Y-%m-%d %H:%M"))
    }
}
