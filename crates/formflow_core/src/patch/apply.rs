use serde_json::Value;
use thiserror::Error;

use super::operation::{OpKind, Operation};
use crate::pointer;

/// Why a single operation could not be applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchFailure {
    #[error("path does not exist")]
    PathNotFound,

    #[error("parent container does not exist")]
    ParentNotFound,

    #[error("array index {0} is out of bounds")]
    IndexOutOfBounds(usize),

    #[error("invalid array index {0:?}")]
    InvalidIndex(String),

    #[error("the document root cannot be removed")]
    RemoveRoot,
}

/// A rejected batch. Identifies the first failing operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("operation #{index} ({op} {path}) failed: {reason}")]
pub struct PatchError {
    pub index: usize,
    pub op: OpKind,
    pub path: String,
    pub reason: PatchFailure,
}

/// Apply `ops` in order to a copy of `doc`.
///
/// Either every operation succeeds and the new document is returned, or the
/// first failure is reported and `doc` is left as it was.
pub fn apply_patch(doc: &Value, ops: &[Operation]) -> Result<Value, PatchError> {
    let mut working = doc.clone();
    for (index, op) in ops.iter().enumerate() {
        apply_operation(&mut working, op).map_err(|reason| PatchError {
            index,
            op: op.kind(),
            path: op.path().to_string(),
            reason,
        })?;
    }
    Ok(working)
}

fn apply_operation(doc: &mut Value, op: &Operation) -> Result<(), PatchFailure> {
    match op {
        Operation::Add { path, value } => add(doc, path, value.clone()),
        Operation::Replace { path, value } => replace(doc, path, value.clone()),
        Operation::Remove { path } => remove(doc, path),
    }
}

fn add(doc: &mut Value, path: &str, value: Value) -> Result<(), PatchFailure> {
    let Some((parent, last)) = pointer::parent_and_last(path) else {
        *doc = value;
        return Ok(());
    };

    match pointer::get_mut(doc, &parent) {
        Some(Value::Object(map)) => {
            map.insert(last, value);
            Ok(())
        }
        Some(Value::Array(items)) => {
            if last == "-" {
                items.push(value);
                return Ok(());
            }
            let index = pointer::parse_index(&last).ok_or(PatchFailure::InvalidIndex(last))?;
            if index > items.len() {
                return Err(PatchFailure::IndexOutOfBounds(index));
            }
            items.insert(index, value);
            Ok(())
        }
        _ => Err(PatchFailure::ParentNotFound),
    }
}

fn replace(doc: &mut Value, path: &str, value: Value) -> Result<(), PatchFailure> {
    let target = pointer::get_mut(doc, path).ok_or(PatchFailure::PathNotFound)?;
    *target = value;
    Ok(())
}

fn remove(doc: &mut Value, path: &str) -> Result<(), PatchFailure> {
    let (parent, last) = pointer::parent_and_last(path).ok_or(PatchFailure::RemoveRoot)?;

    match pointer::get_mut(doc, &parent) {
        Some(Value::Object(map)) => map
            .remove(&last)
            .map(|_| ())
            .ok_or(PatchFailure::PathNotFound),
        Some(Value::Array(items)) => match pointer::parse_index(&last) {
            Some(index) if index < items.len() => {
                items.remove(index);
                Ok(())
            }
            _ => Err(PatchFailure::PathNotFound),
        },
        _ => Err(PatchFailure::PathNotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn add_into_existing_object() {
        let doc = json!({"contact": {}});
        let next = apply_patch(&doc, &[Operation::add("/contact/name", json!("Ada"))]).unwrap();
        assert_eq!(next, json!({"contact": {"name": "Ada"}}));
        assert_eq!(doc, json!({"contact": {}}), "input must not be mutated");
    }

    #[test]
    fn add_overwrites_existing_key() {
        let doc = json!({"name": "Ada"});
        let next = apply_patch(&doc, &[Operation::add("/name", json!("Grace"))]).unwrap();
        assert_eq!(next, json!({"name": "Grace"}));
    }

    #[test]
    fn add_does_not_create_intermediate_levels() {
        let err = apply_patch(&json!({}), &[Operation::add("/contact/name", json!("Ada"))])
            .unwrap_err();
        assert_eq!(err.index, 0);
        assert_eq!(err.op, OpKind::Add);
        assert_eq!(err.path, "/contact/name");
        assert_eq!(err.reason, PatchFailure::ParentNotFound);
    }

    #[test]
    fn add_inserts_and_appends_in_arrays() {
        let doc = json!({"tags": ["a", "c"]});
        let next = apply_patch(
            &doc,
            &[
                Operation::add("/tags/1", json!("b")),
                Operation::add("/tags/-", json!("d")),
                Operation::add("/tags/4", json!("e")),
            ],
        )
        .unwrap();
        assert_eq!(next, json!({"tags": ["a", "b", "c", "d", "e"]}));

        let err = apply_patch(&doc, &[Operation::add("/tags/7", json!("x"))]).unwrap_err();
        assert_eq!(err.reason, PatchFailure::IndexOutOfBounds(7));
        let err = apply_patch(&doc, &[Operation::add("/tags/x", json!("x"))]).unwrap_err();
        assert_eq!(err.reason, PatchFailure::InvalidIndex("x".to_string()));
    }

    #[test]
    fn add_at_root_replaces_document() {
        let next = apply_patch(&json!({"a": 1}), &[Operation::add("", json!([1]))]).unwrap();
        assert_eq!(next, json!([1]));
    }

    #[test]
    fn replace_requires_existing_path() {
        let err = apply_patch(&json!({}), &[Operation::replace("/x", json!(1))]).unwrap_err();
        assert_eq!(err.reason, PatchFailure::PathNotFound);

        let next = apply_patch(&json!({"x": 0}), &[Operation::replace("/x", json!(1))]).unwrap();
        assert_eq!(next, json!({"x": 1}));
    }

    #[test]
    fn remove_requires_existing_path() {
        let doc = json!({"a": {"b": 1}, "list": [1, 2, 3]});
        let next = apply_patch(
            &doc,
            &[Operation::remove("/a/b"), Operation::remove("/list/0")],
        )
        .unwrap();
        assert_eq!(next, json!({"a": {}, "list": [2, 3]}));

        let err = apply_patch(&doc, &[Operation::remove("/a/missing")]).unwrap_err();
        assert_eq!(err.reason, PatchFailure::PathNotFound);
        let err = apply_patch(&doc, &[Operation::remove("")]).unwrap_err();
        assert_eq!(err.reason, PatchFailure::RemoveRoot);
    }

    #[test]
    fn operations_observe_earlier_effects() {
        let next = apply_patch(
            &json!({}),
            &[
                Operation::add("/contact", json!({})),
                Operation::add("/contact/name", json!("Ada")),
                Operation::replace("/contact/name", json!("Grace")),
            ],
        )
        .unwrap();
        assert_eq!(next, json!({"contact": {"name": "Grace"}}));
    }

    #[test]
    fn failing_operation_rejects_whole_batch() {
        let doc = json!({"a": 1});
        let err = apply_patch(
            &doc,
            &[
                Operation::replace("/a", json!(2)),
                Operation::remove("/missing"),
            ],
        )
        .unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.to_string(), "operation #1 (remove /missing) failed: path does not exist");
    }
}
