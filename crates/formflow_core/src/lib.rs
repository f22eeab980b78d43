//! formflow_core - Core types and algorithms for the formflow conversation engine
//!
//! This crate provides the foundational pieces shared by every other formflow crate:
//! - `pointer` - JSON Pointer encode/decode/get/set/join
//! - `binding` - `${pointer}` placeholder expansion against the current document
//! - `patch` - structural diff and all-or-nothing application of operations
//! - `step` - template references, loaded steps and committed steps
//! - `template` - the declarative widget tree a step renders

pub mod binding;
pub mod patch;
pub mod pointer;
pub mod step;
pub mod template;

use std::collections::HashMap;

// Re-export commonly used types
pub use binding::{resolve_binding, resolve_path, Binding};
pub use patch::{apply_patch, diff, Operation, PatchError, PatchFailure};
pub use pointer::PointerError;
pub use step::{CommittedStep, LoadedStep, StepMode, TemplateRef};
pub use template::{ListSource, Template, Widget, WidgetKind};

/// A JSON document being edited.
pub type Document = serde_json::Value;

/// Per-conversation key-value bag owned by actions.
pub type SessionState = HashMap<String, serde_json::Value>;

/// Values captured from inputs that are not bound to the document, keyed by widget id.
pub type Vars = HashMap<String, serde_json::Value>;
