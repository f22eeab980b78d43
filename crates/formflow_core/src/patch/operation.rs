use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One instruction against a document, serialized as `{op, path, value?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Operation {
    /// Insert or overwrite. The parent container must already exist.
    Add {
        path: String,
        #[serde(default)]
        value: Value,
    },
    /// Overwrite an existing value.
    Replace {
        path: String,
        #[serde(default)]
        value: Value,
    },
    /// Delete an existing value.
    Remove { path: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Add,
    Replace,
    Remove,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpKind::Add => "add",
            OpKind::Replace => "replace",
            OpKind::Remove => "remove",
        };
        f.write_str(name)
    }
}

impl Operation {
    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Operation::Add {
            path: path.into(),
            value,
        }
    }

    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Operation::Replace {
            path: path.into(),
            value,
        }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Operation::Remove { path: path.into() }
    }

    pub fn path(&self) -> &str {
        match self {
            Operation::Add { path, .. }
            | Operation::Replace { path, .. }
            | Operation::Remove { path } => path,
        }
    }

    pub fn kind(&self) -> OpKind {
        match self {
            Operation::Add { .. } => OpKind::Add,
            Operation::Replace { .. } => OpKind::Replace,
            Operation::Remove { .. } => OpKind::Remove,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Operation::Add { value, .. } | Operation::Replace { value, .. } => Some(value),
            Operation::Remove { .. } => None,
        }
    }
}
