use std::sync::Arc;

use formflow_core::Operation;

use crate::context::ActionContext;
use crate::error::ActionError;

/// A named function computing operations for an explicit-mode step.
///
/// Return an empty list when there is nothing to do. Side effects go through
/// `ctx.runtime` only.
pub trait Action: Send + Sync {
    fn name(&self) -> &str;

    fn run(&self, ctx: &mut ActionContext<'_>) -> Result<Vec<Operation>, ActionError>;
}

pub type SharedAction = Arc<dyn Action>;

/// Adapts a closure into an [`Action`].
pub struct FnAction<F> {
    name: String,
    func: F,
}

impl<F> FnAction<F>
where
    F: Fn(&mut ActionContext<'_>) -> Result<Vec<Operation>, ActionError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Action for FnAction<F>
where
    F: Fn(&mut ActionContext<'_>) -> Result<Vec<Operation>, ActionError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, ctx: &mut ActionContext<'_>) -> Result<Vec<Operation>, ActionError> {
        (self.func)(ctx)
    }
}
