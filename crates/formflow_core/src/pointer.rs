//! JSON Pointer addressing over `serde_json::Value` trees.
//!
//! Both `""` and `"/"` address the document root. Segments escape `~` as `~0`
//! and `/` as `~1`.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointerError {
    #[error("pointer tail must be empty or start with '/', got {0:?}")]
    InvalidTail(String),
}

/// Escape a raw key so it can be used as a single pointer segment.
pub fn encode_segment(segment: &str) -> String {
    // `~` first, otherwise the `~1` introduced for `/` would be escaped again.
    segment.replace('~', "~0").replace('/', "~1")
}

/// Inverse of [`encode_segment`].
pub fn decode_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

pub fn is_root(pointer: &str) -> bool {
    pointer.is_empty() || pointer == "/"
}

/// Split a pointer into decoded segments. The root yields no segments.
pub fn segments(pointer: &str) -> Vec<String> {
    if is_root(pointer) {
        return Vec::new();
    }
    pointer.split('/').skip(1).map(decode_segment).collect()
}

/// Build a pointer from raw (unescaped) segments.
pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|segment| format!("/{}", encode_segment(segment.as_ref())))
        .collect()
}

/// Split a pointer into its parent pointer and decoded last segment.
///
/// Returns `None` for the root, which has no parent.
pub fn parent_and_last(pointer: &str) -> Option<(String, String)> {
    let mut segments = segments(pointer);
    let last = segments.pop()?;
    Some((from_segments(&segments), last))
}

/// Parse an array index segment. Leading zeros and signs are rejected.
pub fn parse_index(segment: &str) -> Option<usize> {
    let digits_only = !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit());
    if !digits_only || (segment.len() > 1 && segment.starts_with('0')) {
        return None;
    }
    segment.parse().ok()
}

/// Look up the value at `pointer`. Missing or non-container intermediates yield `None`.
pub fn get<'a>(doc: &'a Value, pointer: &str) -> Option<&'a Value> {
    segments(pointer)
        .iter()
        .try_fold(doc, |node, segment| match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => parse_index(segment).and_then(|index| items.get(index)),
            _ => None,
        })
}

/// Mutable variant of [`get`].
pub fn get_mut<'a>(doc: &'a mut Value, pointer: &str) -> Option<&'a mut Value> {
    segments(pointer)
        .iter()
        .try_fold(doc, |node, segment| match node {
            Value::Object(map) => map.get_mut(segment),
            Value::Array(items) => parse_index(segment).and_then(move |index| items.get_mut(index)),
            _ => None,
        })
}

/// Write `value` at `pointer`, creating (or overwriting with) empty mappings
/// for every intermediate that is not a container. No-op on the root.
pub fn set(doc: &mut Value, pointer: &str, value: Value) {
    let segments = segments(pointer);
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = doc;
    for segment in parents {
        current = child_mut(current, segment);
    }
    *child_mut(current, last) = value;
}

/// Append `tail` to `base`. `tail` must be empty, `/`, or start with `/`.
pub fn join(base: &str, tail: &str) -> Result<String, PointerError> {
    if is_root(tail) {
        return Ok(base.to_string());
    }
    if !tail.starts_with('/') {
        return Err(PointerError::InvalidTail(tail.to_string()));
    }
    Ok(format!("{base}{tail}"))
}

enum Slot {
    Index(usize),
    Append,
    Key,
}

fn slot(node: &Value, segment: &str) -> Slot {
    match node {
        Value::Array(_) if segment == "-" => Slot::Append,
        Value::Array(items) => match parse_index(segment) {
            Some(index) if index < items.len() => Slot::Index(index),
            Some(index) if index == items.len() => Slot::Append,
            _ => Slot::Key,
        },
        _ => Slot::Key,
    }
}

fn child_mut<'a>(node: &'a mut Value, segment: &str) -> &'a mut Value {
    match slot(node, segment) {
        Slot::Index(index) => &mut node[index],
        Slot::Append => {
            let len = node.as_array().map_or(0, Vec::len);
            if let Some(items) = node.as_array_mut() {
                items.push(Value::Null);
            }
            &mut node[len]
        }
        Slot::Key => {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            &mut node[segment]
        }
    }
}
