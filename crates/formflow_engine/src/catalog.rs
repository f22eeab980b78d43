use std::collections::HashMap;

use formflow_core::{LoadedStep, TemplateRef};

/// templatePath → step, used to turn persisted references back into steps.
#[derive(Debug, Clone, Default)]
pub struct StepCatalog {
    steps: HashMap<String, LoadedStep>,
}

impl StepCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_steps<'a>(steps: impl IntoIterator<Item = &'a LoadedStep>) -> Self {
        let mut catalog = Self::new();
        for step in steps {
            catalog.register(step.clone());
        }
        catalog
    }

    /// Later registrations of the same path win.
    pub fn register(&mut self, step: LoadedStep) {
        self.steps.insert(step.template_path().to_string(), step);
    }

    pub fn get(&self, template_path: &str) -> Option<&LoadedStep> {
        self.steps.get(template_path)
    }

    pub fn contains(&self, template_path: &str) -> bool {
        self.steps.contains_key(template_path)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Resolve references in order, silently dropping unknown paths.
    pub fn resolve(&self, refs: &[TemplateRef]) -> Vec<LoadedStep> {
        refs.iter()
            .filter_map(|reference| match self.get(&reference.template_path) {
                Some(step) => Some(LoadedStep::new(reference.clone(), step.template.clone())),
                None => {
                    tracing::debug!(
                        template_path = %reference.template_path,
                        "dropping unknown pending step"
                    );
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formflow_core::Template;

    #[test]
    fn resolve_keeps_order_and_drops_unknown() {
        let catalog = StepCatalog::from_steps(&[
            LoadedStep::new(TemplateRef::diff("a"), Template::new("A")),
            LoadedStep::new(TemplateRef::diff("b"), Template::new("B")),
        ]);

        let resolved = catalog.resolve(&[
            TemplateRef::diff("b"),
            TemplateRef::diff("gone"),
            TemplateRef::explicit("a"),
        ]);
        let paths: Vec<&str> = resolved.iter().map(LoadedStep::template_path).collect();
        assert_eq!(paths, ["b", "a"]);
        assert_eq!(resolved[1].template.title, "A");
        assert_eq!(resolved[1].reference, TemplateRef::explicit("a"));
    }
}
