//! Wire and storage shapes of persisted conversations

use chrono::{DateTime, Utc};
use formflow_core::step::deserialize_timestamp;
use formflow_core::{CommittedStep, Operation, SessionState, StepMode, TemplateRef};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Returned by `create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationHandle {
    pub id: String,
    pub title: String,
}

/// One row of `list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    #[serde(alias = "updatedAt", deserialize_with = "deserialize_timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to rehydrate a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub initial: Value,
    #[serde(default)]
    pub steps: Vec<CommittedStep>,
    #[serde(default)]
    pub pending_steps: Vec<TemplateRef>,
    #[serde(default)]
    pub session_state: SessionState,
}

/// Body of `appendStep`. The backend stamps the time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepAppend {
    pub template_path: String,
    pub mode: StepMode,
    #[serde(default)]
    pub ops: Vec<Operation>,
}

impl From<&CommittedStep> for StepAppend {
    fn from(step: &CommittedStep) -> Self {
        Self {
            template_path: step.template_path.clone(),
            mode: step.mode,
            ops: step.ops.clone(),
        }
    }
}

/// Body of `saveState`: auxiliary workflow bookkeeping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    #[serde(default)]
    pub pending_steps: Vec<TemplateRef>,
    #[serde(default)]
    pub session_state: SessionState,
}

/// A conversation as kept by a storage backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredConversation {
    #[serde(flatten)]
    pub record: ConversationRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredConversation {
    /// A fresh record. A missing title falls back to the id.
    pub fn new(id: impl Into<String>, title: Option<&str>, initial: Value) -> Self {
        let id = id.into();
        let now = Utc::now();
        Self {
            record: ConversationRecord {
                title: title.map(str::to_string).unwrap_or_else(|| id.clone()),
                id,
                initial,
                steps: Vec::new(),
                pending_steps: Vec::new(),
                session_state: SessionState::new(),
            },
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn handle(&self) -> ConversationHandle {
        ConversationHandle {
            id: self.record.id.clone(),
            title: self.record.title.clone(),
        }
    }

    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            id: self.record.id.clone(),
            title: self.record.title.clone(),
            updated_at: self.updated_at,
        }
    }

    pub fn rename(&mut self, title: &str) {
        self.record.title = title.to_string();
        self.touch();
    }

    pub fn append(&mut self, step: &StepAppend) {
        self.record.steps.push(CommittedStep {
            template_path: step.template_path.clone(),
            mode: step.mode,
            ops: step.ops.clone(),
            at: Utc::now(),
        });
        self.touch();
    }

    /// Pop the last step. Undo on an empty history is a no-op.
    pub fn undo(&mut self) {
        self.record.steps.pop();
        self.touch();
    }

    pub fn reset(&mut self) {
        self.record.steps.clear();
        self.touch();
    }

    pub fn save_state(&mut self, state: &StateSnapshot) {
        self.record.pending_steps = state.pending_steps.clone();
        self.record.session_state = state.session_state.clone();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Newest first, the order `list` reports.
pub fn sort_newest_first(summaries: &mut [ConversationSummary]) {
    summaries.sort_by(|left, right| right.updated_at.cmp(&left.updated_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stored_conversation_flattens_record() {
        let stored = StoredConversation::new("c1", None, json!({"contact": {}}));
        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(value["id"], "c1");
        assert_eq!(value["title"], "c1");
        assert_eq!(value["pendingSteps"], json!([]));
        assert!(value.get("created_at").is_some());

        let back: StoredConversation = serde_json::from_value(value).unwrap();
        assert_eq!(back, stored);
    }

    #[test]
    fn append_undo_and_reset_edit_history() {
        let mut stored = StoredConversation::new("c1", Some("Intake"), json!({}));
        let step = StepAppend {
            template_path: "a".to_string(),
            mode: StepMode::Diff,
            ops: vec![Operation::add("/x", json!(1))],
        };
        stored.append(&step);
        stored.append(&step);
        stored.undo();
        assert_eq!(stored.record.steps.len(), 1);
        stored.reset();
        assert!(stored.record.steps.is_empty());
        stored.undo();
        assert!(stored.record.steps.is_empty());
    }

    #[test]
    fn summary_reads_backend_timestamps() {
        let summary: ConversationSummary = serde_json::from_value(json!({
            "id": "c1",
            "title": "Intake",
            "updated_at": "2024-05-01T08:00:00.5"
        }))
        .unwrap();
        assert_eq!(summary.title, "Intake");

        let summary: ConversationSummary = serde_json::from_value(json!({
            "id": "c2",
            "title": "Other",
            "updatedAt": "2024-05-02T08:00:00Z"
        }))
        .unwrap();
        assert_eq!(summary.id, "c2");
    }

    #[test]
    fn record_tolerates_missing_auxiliary_state() {
        let record: ConversationRecord = serde_json::from_value(json!({
            "id": "c1",
            "title": "Intake",
            "initial": {"contact": {}},
            "steps": [{"templatePath": "a", "mode": "diff", "ops": [], "at": "2024-05-01T08:00:00"}]
        }))
        .unwrap();
        assert_eq!(record.steps.len(), 1);
        assert!(record.pending_steps.is_empty());
        assert!(record.session_state.is_empty());
    }
}
