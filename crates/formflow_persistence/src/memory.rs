//! In-process adapter

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::adapter::PersistenceAdapter;
use crate::error::{AdapterError, Result};
use crate::models::{
    sort_newest_first, ConversationHandle, ConversationRecord, ConversationSummary, StateSnapshot,
    StepAppend, StoredConversation,
};

/// Keeps conversations in a map for the lifetime of the process.
#[derive(Default)]
pub struct InMemoryPersistenceAdapter {
    conversations: RwLock<HashMap<String, StoredConversation>>,
}

impl InMemoryPersistenceAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversations.read().await.is_empty()
    }

    async fn update<F>(&self, id: &str, edit: F) -> Result<()>
    where
        F: FnOnce(&mut StoredConversation) + Send,
    {
        let mut conversations = self.conversations.write().await;
        let stored = conversations
            .get_mut(id)
            .ok_or_else(|| AdapterError::NotFound(id.to_string()))?;
        edit(stored);
        Ok(())
    }
}

#[async_trait]
impl PersistenceAdapter for InMemoryPersistenceAdapter {
    async fn create(&self, title: Option<&str>, initial: &Value) -> Result<ConversationHandle> {
        let stored =
            StoredConversation::new(Uuid::new_v4().simple().to_string(), title, initial.clone());
        let handle = stored.handle();
        self.conversations
            .write()
            .await
            .insert(handle.id.clone(), stored);
        tracing::debug!(conversation_id = %handle.id, "created conversation in memory");
        Ok(handle)
    }

    async fn list(&self) -> Result<Vec<ConversationSummary>> {
        let mut summaries: Vec<ConversationSummary> = self
            .conversations
            .read()
            .await
            .values()
            .map(StoredConversation::summary)
            .collect();
        sort_newest_first(&mut summaries);
        Ok(summaries)
    }

    async fn load(&self, id: &str) -> Result<ConversationRecord> {
        self.conversations
            .read()
            .await
            .get(id)
            .map(|stored| stored.record.clone())
            .ok_or_else(|| AdapterError::NotFound(id.to_string()))
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use formflow_core::{Operation, StepMode};
    use serde_json::json;

    #[tokio::test]
    async fn create_load_and_edit() {
        let adapter = InMemoryPersistenceAdapter::new();
        let handle = adapter.create(Some("Intake"), &json!({"contact": {}})).await.unwrap();
        assert_eq!(handle.title, "Intake");

        let step = StepAppend {
            template_path: "contact".to_string(),
            mode: StepMode::Explicit,
            ops: vec![Operation::add("/contact/name", json!("Ada"))],
        };
        adapter.append_step(&handle.id, &step).await.unwrap();
        adapter.rename(&handle.id, "Renamed").await.unwrap();

        let record = adapter.load(&handle.id).await.unwrap();
        assert_eq!(record.title, "Renamed");
        assert_eq!(record.steps.len(), 1);
        assert_eq!(record.initial, json!({"contact": {}}));
    }

    #[tokio::test]
    async fn missing_title_falls_back_to_id() {
        let adapter = InMemoryPersistenceAdapter::new();
        let handle = adapter.create(None, &json!({})).await.unwrap();
        assert_eq!(handle.title, handle.id);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let adapter = InMemoryPersistenceAdapter::new();
        assert!(adapter.load("nope").await.unwrap_err().is_not_found());
        assert!(adapter.undo("nope").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let adapter = InMemoryPersistenceAdapter::new();
        let first = adapter.create(Some("first"), &json!({})).await.unwrap();
        let second = adapter.create(Some("second"), &json!({})).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        adapter.rename(&first.id, "first again").await.unwrap();

        let ids: Vec<String> = adapter.list().await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }
}
