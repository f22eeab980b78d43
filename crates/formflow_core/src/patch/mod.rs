//! Patch algebra: structural diff and ordered, all-or-nothing application.

mod apply;
mod diff;
mod operation;

pub use apply::{apply_patch, PatchError, PatchFailure};
pub use diff::diff;
pub use operation::{OpKind, Operation};
