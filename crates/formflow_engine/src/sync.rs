//! Persistence mirror.
//!
//! Every engine transition sends a snapshot down an unbounded channel. A
//! single worker task reconciles the backend against each snapshot in order,
//! so adapter writes reach the store in commit order. Failures are logged and
//! never reach the engine.

use std::sync::Arc;

use formflow_core::CommittedStep;
use formflow_persistence::{ConversationRecord, PersistenceAdapter, StateSnapshot, StepAppend};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, Mutex};

use crate::engine::EngineState;

/// What the worker believes the backend holds for one conversation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RemoteModel {
    pub id: String,
    pub title: String,
    pub steps: Vec<CommittedStep>,
    pub state: StateSnapshot,
}

impl From<&ConversationRecord> for RemoteModel {
    fn from(record: &ConversationRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            steps: record.steps.clone(),
            state: StateSnapshot {
                pending_steps: record.pending_steps.clone(),
                session_state: record.session_state.clone(),
            },
        }
    }
}

/// Local state at the end of one transition.
#[derive(Debug, Clone)]
pub(crate) struct MirrorSnapshot {
    pub epoch: u64,
    pub id: Option<String>,
    pub title: Option<String>,
    /// Used when the backend record has to be created without a title.
    pub fallback_title: String,
    pub initial: Value,
    pub steps: Vec<CommittedStep>,
    pub state: StateSnapshot,
}

pub(crate) enum MirrorJob {
    /// The backend is known to hold `remote` (sent after a load).
    Track { epoch: u64, remote: RemoteModel },
    Sync(MirrorSnapshot),
    Flush(oneshot::Sender<()>),
}

#[derive(Clone)]
pub(crate) struct MirrorHandle {
    sender: mpsc::UnboundedSender<MirrorJob>,
}

impl MirrorHandle {
    pub fn spawn(
        adapter: Arc<dyn PersistenceAdapter>,
        engine: Arc<Mutex<EngineState>>,
    ) -> Option<Self> {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                tracing::warn!("no tokio runtime, persistence mirroring disabled");
                return None;
            }
        };

        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = MirrorWorker {
            adapter,
            engine,
            epoch: 0,
            id: None,
            remote: None,
        };
        runtime.spawn(worker.run(receiver));
        Some(Self { sender })
    }

    pub fn send(&self, job: MirrorJob) {
        if self.sender.send(job).is_err() {
            tracing::warn!("persistence mirror has stopped, dropping job");
        }
    }

    /// Resolves once every job sent before it has been processed.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        self.send(MirrorJob::Flush(done));
        let _ = wait.await;
    }
}

struct MirrorWorker {
    adapter: Arc<dyn PersistenceAdapter>,
    engine: Arc<Mutex<EngineState>>,
    epoch: u64,
    id: Option<String>,
    remote: Option<RemoteModel>,
}

impl MirrorWorker {
    async fn run(mut self, mut receiver: mpsc::UnboundedReceiver<MirrorJob>) {
        tracing::debug!("persistence mirror started");
        while let Some(job) = receiver.recv().await {
            match job {
                MirrorJob::Track { epoch, remote } => {
                    self.epoch = epoch;
                    self.id = Some(remote.id.clone());
                    self.remote = Some(remote);
                }
                MirrorJob::Sync(snapshot) => {
                    if let Err(err) = self.sync(&snapshot).await {
                        tracing::warn!(
                            conversation_id = ?self.id,
                            error = %err,
                            "failed to mirror conversation, continuing locally"
                        );
                        // unknown backend state, reload on the next job
                        self.remote = None;
                    }
                }
                MirrorJob::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }
        tracing::debug!("persistence mirror stopped");
    }

    async fn sync(&mut self, snapshot: &MirrorSnapshot) -> formflow_persistence::Result<()> {
        if snapshot.epoch < self.epoch {
            tracing::debug!(
                epoch = snapshot.epoch,
                "ignoring snapshot from a previous conversation"
            );
            return Ok(());
        }
        if snapshot.epoch > self.epoch {
            self.epoch = snapshot.epoch;
            self.id = None;
            self.remote = None;
        }
        if self.id.is_none() {
            self.id = snapshot.id.clone();
        }

        let mut remote = match (self.remote.take(), self.id.clone()) {
            (Some(remote), _) => remote,
            (None, Some(id)) => RemoteModel::from(&self.adapter.load(&id).await?),
            (None, None) => self.create(snapshot).await?,
        };

        let result = self.reconcile(&mut remote, snapshot).await;
        self.remote = Some(remote);
        result
    }

    /// Lazily create the backend record and hand its id back to the engine.
    async fn create(
        &mut self,
        snapshot: &MirrorSnapshot,
    ) -> formflow_persistence::Result<RemoteModel> {
        let title = snapshot
            .title
            .clone()
            .unwrap_or_else(|| snapshot.fallback_title.clone());
        let handle = self.adapter.create(Some(&title), &snapshot.initial).await?;
        tracing::info!(
            conversation_id = %handle.id,
            title = %handle.title,
            "created backend conversation"
        );

        self.id = Some(handle.id.clone());
        {
            let mut engine = self.engine.lock().await;
            if engine.epoch == snapshot.epoch && engine.conversation.id().is_none() {
                engine.conversation.set_id(handle.id.clone());
                if engine.conversation.title().is_none() {
                    engine.conversation.set_title(handle.title.clone());
                }
            }
        }

        Ok(RemoteModel {
            id: handle.id,
            title: handle.title,
            steps: Vec::new(),
            state: StateSnapshot::default(),
        })
    }

    async fn reconcile(
        &self,
        remote: &mut RemoteModel,
        snapshot: &MirrorSnapshot,
    ) -> formflow_persistence::Result<()> {
        let id = remote.id.clone();

        if let Some(title) = &snapshot.title {
            if *title != remote.title {
                self.adapter.rename(&id, title).await?;
                remote.title = title.clone();
            }
        }

        let shared = remote
            .steps
            .iter()
            .zip(&snapshot.steps)
            .take_while(|(theirs, ours)| theirs.same_content(ours))
            .count();

        if shared == 0 && !remote.steps.is_empty() {
            self.adapter.reset(&id).await?;
            remote.steps.clear();
        }
        while remote.steps.len() > shared {
            self.adapter.undo(&id).await?;
            remote.steps.pop();
        }
        for step in &snapshot.steps[shared..] {
            self.adapter.append_step(&id, &StepAppend::from(step)).await?;
            remote.steps.push(step.clone());
        }

        if remote.state != snapshot.state {
            self.adapter.save_state(&id, &snapshot.state).await?;
            remote.state = snapshot.state.clone();
        }

        tracing::debug!(conversation_id = %id, steps = remote.steps.len(), "conversation mirrored");
        Ok(())
    }
}
