//! Stateless operation builders available to every action.

use formflow_core::{pointer, Operation, Vars};
use serde_json::{Map, Value};

/// Handle passed to actions as `ctx.helpers`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionHelpers;

impl ActionHelpers {
    pub fn encode(&self, segment: &str) -> String {
        pointer::encode_segment(segment)
    }

    /// Owned copy of the value at `path`, if any.
    pub fn get(&self, doc: &Value, path: &str) -> Option<Value> {
        pointer::get(doc, path).cloned()
    }

    /// Operations that make `path` an object in `doc`, creating every missing
    /// level and replacing non-object values on the way.
    pub fn ensure_object(&self, doc: &Value, path: &str) -> Vec<Operation> {
        let mut ops = Vec::new();
        if !doc.is_object() {
            ops.push(Operation::replace("", Value::Object(Map::new())));
        }

        let segments = pointer::segments(path);
        let mut node = doc.as_object();
        for depth in 1..=segments.len() {
            let prefix = pointer::from_segments(&segments[..depth]);
            let key = &segments[depth - 1];
            match node.and_then(|map| map.get(key)) {
                Some(Value::Object(child)) => node = Some(child),
                Some(_) => {
                    ops.push(Operation::replace(prefix, Value::Object(Map::new())));
                    node = None;
                }
                None => {
                    ops.push(Operation::add(prefix, Value::Object(Map::new())));
                    node = None;
                }
            }
        }
        ops
    }

    /// [`ensure_object`](Self::ensure_object) plus an `add` of `default` for
    /// every key missing under `path`.
    pub fn ensure_keys(
        &self,
        doc: &Value,
        path: &str,
        keys: &[&str],
        default: Value,
    ) -> Vec<Operation> {
        let mut ops = self.ensure_object(doc, path);
        let existing = pointer::get(doc, path).and_then(Value::as_object);
        for key in keys {
            if existing.is_some_and(|map| map.contains_key(*key)) {
                continue;
            }
            let target = format!("{}/{}", path.trim_end_matches('/'), pointer::encode_segment(key));
            ops.push(Operation::add(target, default.clone()));
        }
        ops
    }

    /// Copy an unbound input into the document. Nothing to do when the
    /// variable was not captured.
    pub fn write_from_var(&self, vars: &Vars, var: &str, path: &str) -> Vec<Operation> {
        vars.get(var)
            .map(|value| vec![Operation::add(path, value.clone())])
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formflow_core::apply_patch;
    use serde_json::json;

    #[test]
    fn ensure_object_creates_missing_levels() {
        let doc = json!({"contact": "scalar"});
        let ops = ActionHelpers.ensure_object(&doc, "/contact/address");
        assert_eq!(
            ops,
            vec![
                Operation::replace("/contact", json!({})),
                Operation::add("/contact/address", json!({})),
            ]
        );
        assert_eq!(
            apply_patch(&doc, &ops).unwrap(),
            json!({"contact": {"address": {}}})
        );
    }

    #[test]
    fn ensure_object_is_empty_when_already_present() {
        let doc = json!({"contact": {"address": {}}});
        assert!(ActionHelpers.ensure_object(&doc, "/contact/address").is_empty());
    }

    #[test]
    fn ensure_keys_adds_only_missing_keys() {
        let doc = json!({"custom": {"a": 1}});
        let ops = ActionHelpers.ensure_keys(&doc, "/custom", &["a", "b/c"], json!(null));
        assert_eq!(ops, vec![Operation::add("/custom/b~1c", json!(null))]);

        let ops = ActionHelpers.ensure_keys(&json!({}), "/custom", &["a"], json!(""));
        assert_eq!(
            apply_patch(&json!({}), &ops).unwrap(),
            json!({"custom": {"a": ""}})
        );
    }

    #[test]
    fn write_from_var_skips_missing_vars() {
        let mut vars = Vars::new();
        vars.insert("name".to_string(), json!("Ada"));
        assert_eq!(
            ActionHelpers.write_from_var(&vars, "name", "/contact/name"),
            vec![Operation::add("/contact/name", json!("Ada"))]
        );
        assert!(ActionHelpers.write_from_var(&vars, "phone", "/contact/phone").is_empty());
    }
}
