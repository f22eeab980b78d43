use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use dashmap::{mapref::entry::Entry, DashMap};
use formflow_core::Operation;

use crate::action::{Action, FnAction, SharedAction};
use crate::context::ActionContext;
use crate::error::{ActionError, RegistryError};

/// Dispatch table for explicit-mode steps. A step whose action name is
/// missing here renders its submit control disabled.
pub struct ActionRegistry {
    table: DashMap<String, SharedAction>,
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self {
            table: DashMap::new(),
        }
    }

    /// Add `action` under its own name. Names are trimmed and must be unique.
    pub fn register<A>(&self, action: A) -> Result<(), RegistryError>
    where
        A: Action + 'static,
    {
        let key = action.name().trim().to_string();
        if key.is_empty() {
            return Err(RegistryError::InvalidAction(
                "action name cannot be empty".to_string(),
            ));
        }

        match self.table.entry(key) {
            Entry::Occupied(slot) => Err(RegistryError::DuplicateAction(slot.key().clone())),
            Entry::Vacant(slot) => {
                tracing::debug!(action = %slot.key(), "registered action");
                slot.insert(Arc::new(action));
                Ok(())
            }
        }
    }

    pub fn register_fn<F>(&self, name: &str, func: F) -> Result<(), RegistryError>
    where
        F: Fn(&mut ActionContext<'_>) -> Result<Vec<Operation>, ActionError>
            + Send
            + Sync
            + 'static,
    {
        self.register(FnAction::new(name, func))
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn action_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.table.iter().map(|slot| slot.key().clone()).collect();
        names.sort();
        names
    }

    /// Dispatch `name` with `ctx`. A panicking action is reported as
    /// [`ActionError::Panicked`] and leaves the registry usable.
    pub fn invoke(
        &self,
        name: &str,
        ctx: &mut ActionContext<'_>,
    ) -> Result<Vec<Operation>, ActionError> {
        // clone out so no shard lock is held while the action runs
        let action = match self.table.get(name) {
            Some(slot) => Arc::clone(slot.value()),
            None => return Err(ActionError::NotRegistered(name.to_string())),
        };

        tracing::debug!(action = name, "invoking action");
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| action.run(ctx)))
            .unwrap_or_else(|payload| {
                Err(ActionError::Panicked {
                    action: name.to_string(),
                    message: panic_message(payload.as_ref()),
                })
            });

        match &outcome {
            Ok(ops) => tracing::debug!(action = name, ops = ops.len(), "action finished"),
            Err(err @ ActionError::Panicked { .. }) => {
                tracing::error!(action = name, error = %err, "action panicked")
            }
            Err(err) => tracing::warn!(action = name, error = %err, "action failed"),
        }
        outcome
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
