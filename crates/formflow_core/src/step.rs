use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::patch::Operation;
use crate::template::Template;

/// How a step produces its operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepMode {
    /// Structural diff between the baseline document and the working draft.
    Diff,
    /// Operations returned by the step's named action.
    Explicit,
}

impl fmt::Display for StepMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepMode::Diff => f.write_str("diff"),
            StepMode::Explicit => f.write_str("explicit"),
        }
    }
}

/// Identifies a step template. `template_path` is an opaque catalog key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRef {
    pub template_path: String,
    pub mode: StepMode,
}

impl TemplateRef {
    pub fn new(template_path: impl Into<String>, mode: StepMode) -> Self {
        Self {
            template_path: template_path.into(),
            mode,
        }
    }

    pub fn diff(template_path: impl Into<String>) -> Self {
        Self::new(template_path, StepMode::Diff)
    }

    pub fn explicit(template_path: impl Into<String>) -> Self {
        Self::new(template_path, StepMode::Explicit)
    }
}

/// A step ready to render: its reference plus the resolved template.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedStep {
    pub reference: TemplateRef,
    pub template: Template,
}

impl LoadedStep {
    pub fn new(reference: TemplateRef, template: Template) -> Self {
        Self {
            reference,
            template,
        }
    }

    pub fn template_path(&self) -> &str {
        &self.reference.template_path
    }

    pub fn mode(&self) -> StepMode {
        self.reference.mode
    }
}

/// One entry of conversation history. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommittedStep {
    pub template_path: String,
    pub mode: StepMode,
    #[serde(default)]
    pub ops: Vec<Operation>,
    #[serde(default = "Utc::now", deserialize_with = "deserialize_timestamp")]
    pub at: DateTime<Utc>,
}

impl CommittedStep {
    pub fn new(reference: &TemplateRef, ops: Vec<Operation>) -> Self {
        Self {
            template_path: reference.template_path.clone(),
            mode: reference.mode,
            ops,
            at: Utc::now(),
        }
    }

    pub fn reference(&self) -> TemplateRef {
        TemplateRef::new(self.template_path.clone(), self.mode)
    }

    /// Same step identity and operations, ignoring the timestamp.
    pub fn same_content(&self, other: &CommittedStep) -> bool {
        self.template_path == other.template_path
            && self.mode == other.mode
            && self.ops == other.ops
    }
}

/// Accepts RFC 3339 as well as naive timestamps, which are read as UTC.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    #[test]
    fn template_ref_uses_camel_case() {
        let reference = TemplateRef::explicit("steps/contact.yaml");
        assert_eq!(
            serde_json::to_value(&reference).unwrap(),
            json!({"templatePath": "steps/contact.yaml", "mode": "explicit"})
        );
    }

    #[test]
    fn committed_step_reads_naive_timestamps() {
        let step: CommittedStep = serde_json::from_value(json!({
            "templatePath": "a",
            "mode": "diff",
            "ops": [{"op": "remove", "path": "/x", "value": null}],
            "at": "2024-03-01T10:20:30.123456"
        }))
        .unwrap();
        assert_eq!(step.ops, vec![Operation::remove("/x")]);
        assert_eq!(step.at.year(), 2024);
        assert_eq!(step.at.hour(), 10);
    }

    #[test]
    fn committed_step_reads_rfc3339_and_missing_timestamps() {
        let step: CommittedStep = serde_json::from_value(json!({
            "templatePath": "a",
            "mode": "explicit",
            "at": "2024-03-01T10:20:30+02:00"
        }))
        .unwrap();
        assert_eq!(step.at.hour(), 8);
        assert!(step.ops.is_empty());

        let step: CommittedStep =
            serde_json::from_value(json!({"templatePath": "a", "mode": "diff"})).unwrap();
        assert_eq!(step.reference(), TemplateRef::diff("a"));
    }

    #[test]
    fn same_content_ignores_timestamp() {
        let reference = TemplateRef::diff("a");
        let first = CommittedStep::new(&reference, vec![Operation::remove("/x")]);
        let mut second = first.clone();
        second.at = first.at + chrono::Duration::seconds(5);
        assert!(first.same_content(&second));
    }
}
