use formflow_core::CommittedStep;
use serde_json::Value;

/// Notified after every commit with the recorded step and the new document.
pub trait CommitObserver: Send + Sync {
    fn on_commit(&self, step: &CommittedStep, doc: &Value);
}

impl<F> CommitObserver for F
where
    F: Fn(&CommittedStep, &Value) + Send + Sync,
{
    fn on_commit(&self, step: &CommittedStep, doc: &Value) {
        self(step, doc)
    }
}
