//! JSON-file adapter: one `<id>.json` per conversation

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::adapter::PersistenceAdapter;
use crate::error::{AdapterError, Result};
use crate::models::{
    sort_newest_first, ConversationHandle, ConversationRecord, ConversationSummary, StateSnapshot,
    StepAppend, StoredConversation,
};

pub struct FilePersistenceAdapter {
    base_path: PathBuf,
    // serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl FilePersistenceAdapter {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn conversation_path(&self, id: &str) -> Result<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(AdapterError::NotFound(id.to_string()));
        }
        Ok(self.base_path.join(format!("{}.json", id)))
    }

    async fn read(&self, id: &str) -> Result<StoredConversation> {
        let path = self.conversation_path(id)?;
        if !fs::try_exists(&path).await? {
            return Err(AdapterError::NotFound(id.to_string()));
        }
        let contents = fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    async fn write(&self, stored: &StoredConversation) -> Result<()> {
        fs::create_dir_all(&self.base_path).await?;
        let path = self.conversation_path(stored.id())?;
        let contents = serde_json::to_string_pretty(stored)?;
        fs::write(&path, contents).await?;
        Ok(())
    }

    async fn update<F>(&self, id: &str, edit: F) -> Result<()>
    where
        F: FnOnce(&mut StoredConversation) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut stored = self.read(id).await?;
        edit(&mut stored);
        self.write(&stored).await
    }
}

#[async_trait]
impl PersistenceAdapter for FilePersistenceAdapter {
    async fn create(&self, title: Option<&str>, initial: &Value) -> Result<ConversationHandle> {
        let stored =
            StoredConversation::new(Uuid::new_v4().simple().to_string(), title, initial.clone());
        let _guard = self.write_lock.lock().await;
        self.write(&stored).await?;
        tracing::debug!(
            conversation_id = %stored.id(),
            path = %self.base_path.display(),
            "created conversation file"
        );
        Ok(stored.handle())
    }

    async fn list(&self) -> Result<Vec<ConversationSummary>> {
        if !fs::try_exists(&self.base_path).await? {
            return Ok(Vec::new());
        }

        let mut summaries = Vec::new();
        let mut entries = fs::read_dir(&self.base_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let contents = fs::read_to_string(&path).await?;
            match serde_json::from_str::<StoredConversation>(&contents) {
                Ok(stored) => summaries.push(stored.summary()),
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "skipping unreadable conversation file"
                    )
                }
            }
        }
        sort_newest_first(&mut summaries);
        Ok(summaries)
    }

    async fn load(&self, id: &str) -> Result<ConversationRecord> {
        Ok(self.read(id).await?.record)
    }

    async fn rename(&self, id: &str, title: &str) -> Result<()> {
        self.update(id, |stored| stored.rename(title)).await
    }

    async fn append_step(&self, id: &str, step: &StepAppend) -> Result<()> {
        self.update(id, |stored| stored.append(step)).await
    }

    async fn undo(&self, id: &str) -> Result<()> {
        self.update(id, StoredConversation::undo).await
    }

    async fn save_state(&self, id: &str, state: &StateSnapshot) -> Result<()> {
        self.update(id, |stored| stored.save_state(state)).await
    }

    async fn reset(&self, id: &str) -> Result<()> {
        self.update(id, StoredConversation::reset).await
    }

    async fn health(&self) -> Result<()> {
        fs::create_dir_all(&self.base_path).await?;
        Ok(())
    }
}
