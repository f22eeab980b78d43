//! Declarative step templates.
//!
//! A template is a widget tree. Widgets either bind to a pointer in the
//! document (their edits land in the working draft) or are unbound, in which
//! case their value is captured into the action `vars` under the widget id.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::binding::{resolve_binding, resolve_path, Binding};
use crate::pointer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    Text,
    Number,
    Select,
    List,
    FieldPicker,
    Button,
    Group,
}

/// Where a keys-driven list or field picker takes its items from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSource {
    pub base_path: String,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl ListSource {
    /// Keys of the mapping (or indices of the sequence) at `base_path`, minus
    /// `exclude`. A missing or scalar base yields no items.
    pub fn items(&self, doc: &Value) -> Vec<String> {
        let base = resolve_path(&self.base_path, doc);
        let keys: Vec<String> = match pointer::get(doc, &base) {
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            Some(Value::Array(items)) => (0..items.len()).map(|i| i.to_string()).collect(),
            _ => Vec::new(),
        };
        keys.into_iter()
            .filter(|key| !self.exclude.contains(key))
            .collect()
    }

    /// Pointer to one item under the resolved base.
    pub fn item_path(&self, doc: &Value, key: &str) -> String {
        let base = resolve_path(&self.base_path, doc);
        format!("{}/{}", base.trim_end_matches('/'), pointer::encode_segment(key))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "bind", default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<Binding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ListSource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<Value>,
    /// Action name fired by a button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Widget>,
}

impl Widget {
    pub fn new(id: impl Into<String>, kind: WidgetKind) -> Self {
        Self {
            id: id.into(),
            kind,
            label: None,
            binding: None,
            source: None,
            options: Vec::new(),
            action: None,
            children: Vec::new(),
        }
    }

    pub fn bound_to(mut self, path: impl Into<String>) -> Self {
        self.binding = Some(Binding::new(path));
        self
    }

    pub fn with_source(mut self, source: ListSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Widget>) -> Self {
        self.children = children;
        self
    }

    /// Concrete pointer this widget edits. `None` for unbound widgets.
    pub fn resolved_path(&self, doc: &Value) -> Option<String> {
        resolve_binding(self.binding.as_ref(), doc)
    }

    /// Unbound inputs feed `vars`. Buttons and groups carry no value.
    pub fn captures_var(&self) -> bool {
        self.binding.is_none() && !matches!(self.kind, WidgetKind::Button | WidgetKind::Group)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Action run when an explicit-mode step is submitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default)]
    pub widgets: Vec<Widget>,
}

impl Template {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_widgets(mut self, widgets: Vec<Widget>) -> Self {
        self.widgets = widgets;
        self
    }

    pub fn from_yaml(source: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(source)
    }

    /// Every widget in depth-first order, groups included.
    pub fn walk(&self) -> Vec<&Widget> {
        fn visit<'a>(widgets: &'a [Widget], out: &mut Vec<&'a Widget>) {
            for widget in widgets {
                out.push(widget);
                visit(&widget.children, out);
            }
        }

        let mut out = Vec::new();
        visit(&self.widgets, &mut out);
        out
    }

    pub fn find(&self, id: &str) -> Option<&Widget> {
        self.walk().into_iter().find(|widget| widget.id == id)
    }

    /// Widgets whose value is captured into `vars`.
    pub fn unbound_inputs(&self) -> Vec<&Widget> {
        self.walk()
            .into_iter()
            .filter(|widget| widget.captures_var())
            .collect()
    }

    /// Every action name referenced by the template or its buttons.
    pub fn action_names(&self) -> Vec<&str> {
        self.action
            .as_deref()
            .into_iter()
            .chain(self.walk().into_iter().filter_map(|w| w.action.as_deref()))
            .collect()
    }
}
