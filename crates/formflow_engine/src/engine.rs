use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use formflow_actions::{ActionContext, ActionRegistry, RecordingRuntime, RuntimeEffect};
use formflow_core::{diff, CommittedStep, LoadedStep, Operation, SessionState, StepMode, Vars};
use formflow_persistence::{AdapterError, ConversationSummary, PersistenceAdapter};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::catalog::StepCatalog;
use crate::config::EngineConfig;
use crate::conversation::{Conversation, ConversationPhase};
use crate::error::{EngineError, Result};
use crate::observer::CommitObserver;
use crate::store::DocumentStore;
use crate::sync::{MirrorHandle, MirrorJob, MirrorSnapshot, RemoteModel};

pub(crate) struct EngineState {
    pub conversation: Conversation,
    /// Bumped by new/load so late persistence results can be told apart.
    pub epoch: u64,
    pub catalog: StepCatalog,
}

/// Outcome of submitting the current step or running an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Committed { step: CommittedStep, doc: Value },
    /// No step was recorded. Runtime effects such as enqueued steps still apply.
    Unchanged,
    /// The step names no action, or the action is not registered.
    Disabled,
    /// The action failed. Its operations and effects were discarded.
    Failed { action: String, error: String },
}

/// Owns one conversation at a time and mirrors it to an optional adapter.
pub struct ConversationEngine {
    seed: Value,
    declared: Arc<Vec<LoadedStep>>,
    state: Arc<Mutex<EngineState>>,
    actions: Arc<ActionRegistry>,
    adapter: Option<Arc<dyn PersistenceAdapter>>,
    mirror: Option<MirrorHandle>,
    observers: Vec<Arc<dyn CommitObserver>>,
    config: EngineConfig,
}

impl ConversationEngine {
    /// Engine over `seed` walking through `declared` steps, without persistence.
    pub fn new(seed: Value, declared: Vec<LoadedStep>) -> Self {
        let catalog = StepCatalog::from_steps(&declared);
        let state = EngineState {
            conversation: Conversation::new(seed.clone()),
            epoch: 0,
            catalog,
        };
        Self {
            seed,
            declared: Arc::new(declared),
            state: Arc::new(Mutex::new(state)),
            actions: Arc::new(ActionRegistry::new()),
            adapter: None,
            mirror: None,
            observers: Vec::new(),
            config: EngineConfig::default(),
        }
    }

    pub fn with_actions(mut self, actions: Arc<ActionRegistry>) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a persistence adapter. Mirroring starts when called inside a
    /// tokio runtime.
    pub fn with_adapter(mut self, adapter: Arc<dyn PersistenceAdapter>) -> Self {
        self.mirror = MirrorHandle::spawn(Arc::clone(&adapter), Arc::clone(&self.state));
        self.adapter = Some(adapter);
        self
    }

    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: CommitObserver + 'static,
    {
        self.observers.push(Arc::new(observer));
        self
    }

    pub fn actions(&self) -> &Arc<ActionRegistry> {
        &self.actions
    }

    pub fn declared_steps(&self) -> &[LoadedStep] {
        &self.declared
    }

    pub async fn document(&self) -> Value {
        self.state.lock().await.conversation.document().clone()
    }

    pub async fn committed_steps(&self) -> Vec<CommittedStep> {
        self.state.lock().await.conversation.committed().to_vec()
    }

    pub async fn pending_steps(&self) -> Vec<LoadedStep> {
        self.state
            .lock()
            .await
            .conversation
            .pending()
            .iter()
            .cloned()
            .collect()
    }

    pub async fn session_state(&self) -> SessionState {
        self.state.lock().await.conversation.session_state().clone()
    }

    pub async fn conversation_id(&self) -> Option<String> {
        self.state.lock().await.conversation.id().map(str::to_string)
    }

    pub async fn title(&self) -> Option<String> {
        self.state.lock().await.conversation.title().map(str::to_string)
    }

    pub async fn current_step(&self) -> Option<LoadedStep> {
        let state = self.state.lock().await;
        state.conversation.current_step(&self.declared).cloned()
    }

    pub async fn phase(&self) -> ConversationPhase {
        self.state.lock().await.conversation.phase(&self.declared)
    }

    /// Re-derive the document from history and compare it with the cache.
    pub async fn verify(&self) -> bool {
        self.state.lock().await.conversation.verify()
    }

    /// Commit the current step with no document change.
    pub async fn complete_step(&self) -> Result<CommittedStep> {
        let (step, _) = self.commit(Vec::new()).await?;
        Ok(step)
    }

    pub async fn enqueue_steps(&self, steps: Vec<LoadedStep>) {
        let mut state = self.state.lock().await;
        for step in &steps {
            state.catalog.register(step.clone());
        }
        tracing::debug!(count = steps.len(), "enqueuing steps");
        state.conversation.enqueue(steps);
        self.mirror(&state);
    }

    pub async fn undo_last(&self) -> Result<CommittedStep> {
        let mut state = self.state.lock().await;
        let undone = state.conversation.undo_last()?;
        tracing::info!(
            template_path = %undone.template_path,
            remaining = state.conversation.committed().len(),
            "undid last step"
        );
        self.mirror(&state);
        Ok(undone)
    }

    /// Start over from the seed document. With an adapter the backend record
    /// is created right away.
    pub async fn new_conversation(&self, title: Option<&str>) {
        let mut state = self.state.lock().await;
        let mut conversation = Conversation::new(self.seed.clone());
        if let Some(title) = title {
            conversation.set_title(title);
        }
        state.conversation = conversation;
        state.epoch += 1;
        tracing::info!(epoch = state.epoch, "started new conversation");
        self.mirror(&state);
    }

    /// Replace the current conversation with a persisted one.
    pub async fn load_conversation(&self, id: &str) -> Result<()> {
        let adapter = self.adapter.as_ref().ok_or(EngineError::NoAdapter)?;
        let record = match adapter.load(id).await {
            Ok(record) => record,
            Err(AdapterError::NotFound(_)) => {
                return Err(EngineError::ConversationNotFound(id.to_string()));
            }
            Err(err) => {
                tracing::warn!(conversation_id = %id, error = %err, "failed to load conversation");
                return Err(EngineError::ConversationNotFound(id.to_string()));
            }
        };

        let mut state = self.state.lock().await;
        let pending = state.catalog.resolve(&record.pending_steps);
        let conversation = Conversation::restore(
            record.id.clone(),
            record.title.clone(),
            record.initial.clone(),
            record.steps.clone(),
            pending,
            record.session_state.clone(),
        )
        .map_err(|source| EngineError::InvalidHistory {
            id: id.to_string(),
            source,
        })?;

        state.conversation = conversation;
        state.epoch += 1;
        tracing::info!(
            conversation_id = %record.id,
            steps = record.steps.len(),
            pending = state.conversation.pending().len(),
            "loaded conversation"
        );
        if let Some(mirror) = &self.mirror {
            mirror.send(MirrorJob::Track {
                epoch: state.epoch,
                remote: RemoteModel::from(&record),
            });
            // pending refs dropped by the catalog differ from the record
            mirror.send(MirrorJob::Sync(self.snapshot(&state)));
        }
        Ok(())
    }

    pub async fn rename(&self, title: &str) {
        let mut state = self.state.lock().await;
        state.conversation.set_title(title);
        self.mirror(&state);
    }

    /// Conversations known to the adapter. Failures yield an empty list.
    pub async fn list_conversations(&self) -> Vec<ConversationSummary> {
        let Some(adapter) = &self.adapter else {
            return Vec::new();
        };
        match adapter.list().await {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(error = %err, "failed to list conversations");
                Vec::new()
            }
        }
    }

    /// Drop every committed and pending step, keeping the initial document.
    pub async fn reset_history(&self) {
        let mut state = self.state.lock().await;
        state.conversation.reset_history();
        tracing::info!("conversation history reset");
        self.mirror(&state);
    }

    /// Make a generated template resolvable after a reload.
    pub async fn register_template(&self, step: LoadedStep) {
        self.state.lock().await.catalog.register(step);
    }

    /// Submit the current step: diff mode compares `working` with the
    /// document, explicit mode runs the template's action.
    pub async fn submit(&self, working: &Value, vars: &Vars) -> Result<Submission> {
        let step = self.current_step().await.ok_or(EngineError::NoCurrentStep)?;
        match step.mode() {
            StepMode::Diff => {
                let ops = diff(&self.document().await, working);
                if ops.is_empty() {
                    return Ok(Submission::Unchanged);
                }
                let (step, doc) = self.commit(ops).await?;
                Ok(Submission::Committed { step, doc })
            }
            StepMode::Explicit => match step.template.action.as_deref() {
                Some(action) => self.run_action(action, working, vars).await,
                None => Ok(Submission::Disabled),
            },
        }
    }

    /// Run `name` against the current step as one transition: its operations
    /// are committed first, then its runtime effects apply in call order.
    pub async fn run_action(&self, name: &str, working: &Value, vars: &Vars) -> Result<Submission> {
        if !self.actions.is_enabled(name) {
            tracing::debug!(action = name, "action not registered, control disabled");
            return Ok(Submission::Disabled);
        }

        let mut state = self.state.lock().await;
        let cursor = state
            .conversation
            .cursor(&self.declared)
            .ok_or(EngineError::NoCurrentStep)?;

        let baseline = state.conversation.document().clone();
        let mut runtime = RecordingRuntime::new(state.conversation.session_state().clone());
        let outcome = {
            let mut ctx = ActionContext::new(&baseline, working, vars, &mut runtime);
            self.actions.invoke(name, &mut ctx)
        };
        let ops = match outcome {
            Ok(ops) => ops,
            Err(err) => {
                tracing::warn!(action = name, error = %err, "discarding failed action");
                return Ok(Submission::Failed {
                    action: name.to_string(),
                    error: err.to_string(),
                });
            }
        };

        let mut next = state.conversation.clone();
        let mut committed = Vec::new();
        if !ops.is_empty() {
            committed.push(next.commit_at(&cursor, ops)?);
        }

        let mut generated = Vec::new();
        for effect in runtime.into_effects() {
            match effect {
                RuntimeEffect::SetState { key, value } => next.set_state(key, value),
                RuntimeEffect::Enqueue(steps) => {
                    generated.extend(steps.iter().cloned());
                    next.enqueue(steps);
                }
                RuntimeEffect::CompleteStep if committed.is_empty() => {
                    committed.push(next.commit_at(&cursor, Vec::new())?);
                }
                RuntimeEffect::CompleteStep => {
                    tracing::debug!(
                        action = name,
                        "step already committed, ignoring complete_step"
                    );
                }
            }
        }

        state.conversation = next;
        for step in generated {
            state.catalog.register(step);
        }
        self.mirror(&state);
        let doc = state.conversation.document().clone();
        drop(state);

        match committed.pop() {
            Some(step) => {
                tracing::info!(
                    action = name,
                    template_path = %step.template_path,
                    ops = step.ops.len(),
                    "action committed step"
                );
                self.notify(&step, &doc);
                Ok(Submission::Committed { step, doc })
            }
            None => Ok(Submission::Unchanged),
        }
    }

    /// Wait until every persistence write issued so far has been attempted.
    pub async fn flush(&self) {
        if let Some(mirror) = &self.mirror {
            mirror.flush().await;
        }
    }

    async fn commit(&self, ops: Vec<Operation>) -> Result<(CommittedStep, Value)> {
        let mut state = self.state.lock().await;
        let step = state.conversation.commit(&self.declared, ops)?;
        tracing::info!(
            template_path = %step.template_path,
            mode = %step.mode,
            ops = step.ops.len(),
            "committed step"
        );
        self.mirror(&state);
        let doc = state.conversation.document().clone();
        drop(state);

        self.notify(&step, &doc);
        Ok((step, doc))
    }

    fn notify(&self, step: &CommittedStep, doc: &Value) {
        for observer in &self.observers {
            observer.on_commit(step, doc);
        }
    }

    fn snapshot(&self, state: &EngineState) -> MirrorSnapshot {
        let conversation = &state.conversation;
        MirrorSnapshot {
            epoch: state.epoch,
            id: conversation.id().map(str::to_string),
            title: conversation.title().map(str::to_string),
            fallback_title: self.config.generated_title(Utc::now()),
            initial: conversation.initial().clone(),
            steps: conversation.committed().to_vec(),
            state: conversation.state_snapshot(),
        }
    }

    /// Sent while the state lock is held so jobs queue in transition order.
    fn mirror(&self, state: &EngineState) {
        if let Some(mirror) = &self.mirror {
            mirror.send(MirrorJob::Sync(self.snapshot(state)));
        }
    }
}

#[async_trait]
impl DocumentStore for ConversationEngine {
    async fn get_doc(&self) -> Value {
        self.document().await
    }

    async fn apply_patch(&self, ops: Vec<Operation>) -> Result<Value> {
        if ops.is_empty() {
            return Ok(self.document().await);
        }
        let (_, doc) = self.commit(ops).await?;
        Ok(doc)
    }
}
