use formflow_core::{LoadedStep, SessionState, Vars};
use serde_json::Value;

use crate::helpers::ActionHelpers;

/// What an action may ask of the engine besides returning operations.
pub trait StepRuntime {
    /// Append steps to the tail of the pending queue.
    fn enqueue_steps(&mut self, steps: Vec<LoadedStep>);

    /// Owned copy of a session-state entry.
    fn get_state(&self, key: &str) -> Option<Value>;

    fn set_state(&mut self, key: &str, value: Value);

    /// Commit the current step without document changes.
    fn complete_step(&mut self);
}

/// A deferred runtime call, applied by the engine after the action returns.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeEffect {
    Enqueue(Vec<LoadedStep>),
    SetState { key: String, value: Value },
    CompleteStep,
}

/// [`StepRuntime`] that works on a private copy of the session state and
/// records every call, so a failed action can be discarded wholesale.
#[derive(Debug, Clone, Default)]
pub struct RecordingRuntime {
    state: SessionState,
    effects: Vec<RuntimeEffect>,
}

impl RecordingRuntime {
    pub fn new(state: SessionState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    pub fn effects(&self) -> &[RuntimeEffect] {
        &self.effects
    }

    pub fn into_effects(self) -> Vec<RuntimeEffect> {
        self.effects
    }
}

impl StepRuntime for RecordingRuntime {
    fn enqueue_steps(&mut self, steps: Vec<LoadedStep>) {
        self.effects.push(RuntimeEffect::Enqueue(steps));
    }

    fn get_state(&self, key: &str) -> Option<Value> {
        self.state.get(key).cloned()
    }

    fn set_state(&mut self, key: &str, value: Value) {
        self.state.insert(key.to_string(), value.clone());
        self.effects.push(RuntimeEffect::SetState {
            key: key.to_string(),
            value,
        });
    }

    fn complete_step(&mut self) {
        self.effects.push(RuntimeEffect::CompleteStep);
    }
}

/// Everything an action sees during one invocation.
pub struct ActionContext<'a> {
    /// Document as of the start of the current step.
    pub doc: &'a Value,
    /// In-progress draft.
    pub working: &'a Value,
    /// Values of unbound inputs, keyed by widget id.
    pub vars: &'a Vars,
    pub helpers: ActionHelpers,
    pub runtime: &'a mut dyn StepRuntime,
}

impl<'a> ActionContext<'a> {
    pub fn new(
        doc: &'a Value,
        working: &'a Value,
        vars: &'a Vars,
        runtime: &'a mut dyn StepRuntime,
    ) -> Self {
        Self {
            doc,
            working,
            vars,
            helpers: ActionHelpers,
            runtime,
        }
    }

    /// String value of an unbound input.
    pub fn var_str(&self, name: &str) -> Option<&str> {
        self.vars.get(name).and_then(Value::as_str)
    }
}
