//! Indirect binding paths.
//!
//! A binding path may embed `${/other/pointer}` placeholders. Each placeholder
//! is replaced by the string stored at that pointer in the current document,
//! which lets a template edit "whatever field the user just picked".

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pointer;

/// Where a widget reads and writes its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub path: String,
}

impl Binding {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn is_indirect(&self) -> bool {
        self.path.contains("${")
    }
}

/// Resolve an optional binding to a concrete pointer. `None` only when there
/// is no binding.
pub fn resolve_binding(binding: Option<&Binding>, doc: &Value) -> Option<String> {
    Some(resolve_path(&binding?.path, doc))
}

/// Expand every `${inner}` placeholder in `path` against `doc`.
///
/// A placeholder whose target is not a string starting with `/` expands to
/// `""`, so the result may name a path that does not exist. An unterminated
/// `${` is kept as literal text.
pub fn resolve_path(path: &str, doc: &Value) -> String {
    if !path.contains("${") {
        return path.to_string();
    }

    let mut resolved = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        resolved.push_str(&rest[..start]);

        let inner = &after[..end];
        match pointer::get(doc, inner).and_then(Value::as_str) {
            Some(target) if target.starts_with('/') => resolved.push_str(target),
            _ => tracing::trace!(path, placeholder = inner, "binding placeholder unresolved"),
        }
        rest = &after[end + 1..];
    }
    resolved.push_str(rest);

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn no_binding_is_unresolved() {
        assert_eq!(resolve_binding(None, &json!({})), None);
    }

    #[test]
    fn plain_path_is_returned_verbatim() {
        let binding = Binding::new("/contact/name");
        assert_eq!(
            resolve_binding(Some(&binding), &json!({})),
            Some("/contact/name".to_string())
        );
    }

    #[test]
    fn placeholder_is_replaced_by_picked_path() {
        let doc = json!({"ui": {"picked": "/contact/phone"}});
        let binding = Binding::new("${/ui/picked}");
        assert!(binding.is_indirect());
        assert_eq!(
            resolve_binding(Some(&binding), &doc),
            Some("/contact/phone".to_string())
        );
    }

    #[test]
    fn placeholder_with_suffix_and_prefix() {
        let doc = json!({"ui": {"section": "/contact"}});
        assert_eq!(resolve_path("${/ui/section}/name", &doc), "/contact/name");
        assert_eq!(resolve_path("/drafts${/ui/section}", &doc), "/drafts/contact");
    }

    #[test]
    fn failed_placeholders_expand_to_empty() {
        let doc = json!({"ui": {"picked": "contact", "count": 3}, "contact": {"name": "Ada"}});
        assert_eq!(resolve_path("${/ui/picked}", &doc), "");
        assert_eq!(resolve_path("${/ui/count}/x", &doc), "/x");
        assert_eq!(resolve_path("${/ui/missing}/name", &doc), "/name");
        assert_eq!(
            resolve_binding(Some(&Binding::new("/drafts${/ui/missing}")), &doc),
            Some("/drafts".to_string())
        );
    }

    #[test]
    fn unterminated_placeholder_is_literal() {
        let doc = json!({"ui": {"section": "/contact"}});
        assert_eq!(resolve_path("${/ui/picked", &doc), "${/ui/picked");
        assert_eq!(
            resolve_path("${/ui/section}/${x", &doc),
            "/contact/${x"
        );
    }
}
