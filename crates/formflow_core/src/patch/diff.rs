use serde_json::Value;

use super::operation::Operation;
use crate::pointer::encode_segment;

/// Compute operations that turn `before` into `after`.
///
/// Objects are compared key by key and arrays index by index, so an edit deep
/// inside a document produces a single targeted operation. Equal inputs yield
/// an empty list.
pub fn diff(before: &Value, after: &Value) -> Vec<Operation> {
    let mut ops = Vec::new();
    diff_into(before, after, "", &mut ops);
    ops
}

fn diff_into(before: &Value, after: &Value, path: &str, ops: &mut Vec<Operation>) {
    if before == after {
        return;
    }

    match (before, after) {
        // a top-level "" key has pointer "/", which addresses the root
        (Value::Object(old), Value::Object(new))
            if path.is_empty() && old.get("") != new.get("") =>
        {
            ops.push(Operation::replace("", after.clone()));
        }
        (Value::Object(old), Value::Object(new)) => {
            for (key, old_value) in old {
                let child = child_path(path, key);
                match new.get(key) {
                    Some(new_value) => diff_into(old_value, new_value, &child, ops),
                    None => ops.push(Operation::remove(child)),
                }
            }
            for (key, new_value) in new {
                if !old.contains_key(key) {
                    ops.push(Operation::add(child_path(path, key), new_value.clone()));
                }
            }
        }
        (Value::Array(old), Value::Array(new)) => {
            let shared = old.len().min(new.len());
            for index in 0..shared {
                diff_into(&old[index], &new[index], &format!("{path}/{index}"), ops);
            }
            for index in (shared..old.len()).rev() {
                ops.push(Operation::remove(format!("{path}/{index}")));
            }
            for (index, value) in new.iter().enumerate().skip(shared) {
                ops.push(Operation::add(format!("{path}/{index}"), value.clone()));
            }
        }
        _ => ops.push(Operation::replace(path, after.clone())),
    }
}

fn child_path(parent: &str, key: &str) -> String {
    format!("{parent}/{}", encode_segment(key))
}
