//! formflow_actions - Named actions for explicit-mode steps
//!
//! An action turns `(doc, working, vars)` into operations and may, through
//! its runtime handle, enqueue follow-up steps, read and write session state
//! or complete the current step.

pub mod action;
pub mod context;
pub mod error;
pub mod helpers;
pub mod registry;

pub use action::{Action, FnAction, SharedAction};
pub use context::{ActionContext, RecordingRuntime, RuntimeEffect, StepRuntime};
pub use error::{ActionError, RegistryError, Result};
pub use helpers::ActionHelpers;
pub use registry::ActionRegistry;
