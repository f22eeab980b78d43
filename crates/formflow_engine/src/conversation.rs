//! The conversation aggregate.
//!
//! Pure in-memory state: no I/O, no locking. The engine wraps it with a mutex
//! and mirrors it to the persistence adapter.

use std::collections::VecDeque;

use formflow_core::{
    apply_patch, CommittedStep, LoadedStep, Operation, PatchError, SessionState, TemplateRef,
};
use formflow_persistence::StateSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    /// Nothing committed and nothing pending.
    Fresh,
    InProgress,
    /// No current step left.
    Complete,
}

/// The step a commit is recorded against.
#[derive(Debug, Clone, PartialEq)]
pub struct StepCursor {
    pub step: LoadedStep,
    /// Whether the step is the head of the pending queue.
    pub from_pending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    id: Option<String>,
    title: Option<String>,
    initial: Value,
    current: Value,
    committed: Vec<CommittedStep>,
    pending: VecDeque<LoadedStep>,
    session_state: SessionState,
}

impl Conversation {
    pub fn new(initial: Value) -> Self {
        Self {
            id: None,
            title: None,
            current: initial.clone(),
            initial,
            committed: Vec::new(),
            pending: VecDeque::new(),
            session_state: SessionState::new(),
        }
    }

    /// Rebuild a persisted conversation by replaying `steps` over `initial`.
    pub fn restore(
        id: String,
        title: String,
        initial: Value,
        steps: Vec<CommittedStep>,
        pending: Vec<LoadedStep>,
        session_state: SessionState,
    ) -> std::result::Result<Self, PatchError> {
        let current = Self::replay(&initial, &steps)?;
        Ok(Self {
            id: Some(id),
            title: Some(title),
            initial,
            current,
            committed: steps,
            pending: pending.into(),
            session_state,
        })
    }

    /// `initial` with every step's operations applied in order.
    pub fn replay(
        initial: &Value,
        steps: &[CommittedStep],
    ) -> std::result::Result<Value, PatchError> {
        steps
            .iter()
            .try_fold(initial.clone(), |doc, step| apply_patch(&doc, &step.ops))
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn initial(&self) -> &Value {
        &self.initial
    }

    pub fn document(&self) -> &Value {
        &self.current
    }

    pub fn committed(&self) -> &[CommittedStep] {
        &self.committed
    }

    pub fn pending(&self) -> &VecDeque<LoadedStep> {
        &self.pending
    }

    pub fn session_state(&self) -> &SessionState {
        &self.session_state
    }

    pub fn set_state(&mut self, key: impl Into<String>, value: Value) {
        self.session_state.insert(key.into(), value);
    }

    /// Head of the pending queue, else the declared step at `committed.len()`.
    pub fn cursor(&self, declared: &[LoadedStep]) -> Option<StepCursor> {
        if let Some(head) = self.pending.front() {
            return Some(StepCursor {
                step: head.clone(),
                from_pending: true,
            });
        }
        declared.get(self.committed.len()).map(|step| StepCursor {
            step: step.clone(),
            from_pending: false,
        })
    }

    pub fn current_step<'a>(&'a self, declared: &'a [LoadedStep]) -> Option<&'a LoadedStep> {
        self.pending
            .front()
            .or_else(|| declared.get(self.committed.len()))
    }

    pub fn phase(&self, declared: &[LoadedStep]) -> ConversationPhase {
        if self.current_step(declared).is_none() {
            ConversationPhase::Complete
        } else if self.committed.is_empty() && self.pending.is_empty() {
            ConversationPhase::Fresh
        } else {
            ConversationPhase::InProgress
        }
    }

    /// Commit `ops` against the current step.
    pub fn commit(
        &mut self,
        declared: &[LoadedStep],
        ops: Vec<Operation>,
    ) -> Result<CommittedStep> {
        let cursor = self.cursor(declared).ok_or(EngineError::NoCurrentStep)?;
        self.commit_at(&cursor, ops)
    }

    /// Commit `ops` against an explicit cursor. The document is computed
    /// first; on failure nothing changes.
    pub fn commit_at(&mut self, cursor: &StepCursor, ops: Vec<Operation>) -> Result<CommittedStep> {
        let next = apply_patch(&self.current, &ops)?;
        let step = CommittedStep::new(&cursor.step.reference, ops);

        self.current = next;
        self.committed.push(step.clone());
        if cursor.from_pending
            && self
                .pending
                .front()
                .is_some_and(|head| head.reference == cursor.step.reference)
        {
            self.pending.pop_front();
        }
        Ok(step)
    }

    pub fn enqueue(&mut self, steps: impl IntoIterator<Item = LoadedStep>) {
        self.pending.extend(steps);
    }

    /// Drop the last step, replay the rest from the initial document and
    /// clear the pending queue.
    pub fn undo_last(&mut self) -> Result<CommittedStep> {
        let mut remaining = self.committed.clone();
        let undone = remaining.pop().ok_or(EngineError::NothingToUndo)?;
        self.current = Self::replay(&self.initial, &remaining)?;
        self.committed = remaining;
        self.pending.clear();
        Ok(undone)
    }

    /// Forget every committed and pending step, keeping the initial document.
    pub fn reset_history(&mut self) {
        self.committed.clear();
        self.pending.clear();
        self.current = self.initial.clone();
    }

    /// Whether the cached document agrees with a fresh replay.
    pub fn verify(&self) -> bool {
        Self::replay(&self.initial, &self.committed).is_ok_and(|doc| doc == self.current)
    }

    pub fn pending_refs(&self) -> Vec<TemplateRef> {
        self.pending.iter().map(|step| step.reference.clone()).collect()
    }

    pub fn state_snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            pending_steps: self.pending_refs(),
            session_state: self.session_state.clone(),
        }
    }
}
