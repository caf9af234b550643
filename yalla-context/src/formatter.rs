//! Custom formatters (C4, C6 GLOSSARY): renderers keyed by a value's
//! declared type, exact match preferred over any registered ancestor.

use indexmap::IndexMap;
use std::sync::Arc;
use yalla_core::{Output, Value, TYPE_TAG_KEY};

/// A renderer registered under a type-spec name, overriding the
/// mode-driven default render for matching values.
pub trait Formatter: Send + Sync {
    fn format(&self, value: &Value, output: &mut dyn Output);
}

#[derive(Default)]
pub struct FormatterRegistry {
    formatters: IndexMap<String, Arc<dyn Formatter>>,
    /// Declared-type -> parent type, used for ancestor lookup (§4.4).
    ancestors: IndexMap<String, String>,
}

impl FormatterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, type_spec: impl Into<String>, formatter: Arc<dyn Formatter>) {
        self.formatters.insert(type_spec.into(), formatter);
    }

    /// Declares that `child` inherits from `parent` for formatter-ancestor
    /// lookup purposes.
    pub fn register_ancestor(&mut self, child: impl Into<String>, parent: impl Into<String>) {
        self.ancestors.insert(child.into(), parent.into());
    }

    /// Exact-type lookup first, then walk the declared ancestor chain.
    pub fn formatter_for(&self, value: &Value) -> Option<Arc<dyn Formatter>> {
        let declared = value.declared_type();
        if let Some(formatter) = self.formatters.get(declared) {
            return Some(Arc::clone(formatter));
        }
        let mut current = declared;
        while let Some(parent) = self.ancestors.get(current) {
            if let Some(formatter) = self.formatters.get(parent) {
                return Some(Arc::clone(formatter));
            }
            current = parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yalla_core::OutputChannel;

    struct Tag(&'static str);
    impl Formatter for Tag {
        fn format(&self, _value: &Value, output: &mut dyn Output) {
            output.write(OutputChannel::Stdout, self.0);
        }
    }

    #[test]
    fn exact_type_registration_wins_over_ancestor() {
        let mut registry = FormatterRegistry::new();
        registry.register("Animal", Arc::new(Tag("animal-formatter")));
        registry.register("Dog", Arc::new(Tag("dog-formatter")));
        registry.register_ancestor("Dog", "Animal");

        let mut dog = yalla_core::OrderedMap::new();
        dog.insert(TYPE_TAG_KEY.to_string(), Value::Str("Dog".to_string()));
        let value = Value::Map(dog);

        let formatter = registry.formatter_for(&value).unwrap();
        let mut out = yalla_core::BufferOutput::new();
        formatter.format(&value, &mut out);
        assert_eq!(out.lines(), &["dog-formatter".to_string()]);
    }

    #[test]
    fn ancestor_lookup_used_when_no_exact_match() {
        let mut registry = FormatterRegistry::new();
        registry.register("Animal", Arc::new(Tag("animal-formatter")));
        registry.register_ancestor("Dog", "Animal");

        let mut dog = yalla_core::OrderedMap::new();
        dog.insert(TYPE_TAG_KEY.to_string(), Value::Str("Dog".to_string()));
        let value = Value::Map(dog);

        let formatter = registry.formatter_for(&value).unwrap();
        let mut out = yalla_core::BufferOutput::new();
        formatter.format(&value, &mut out);
        assert_eq!(out.lines(), &["animal-formatter".to_string()]);
    }

    #[test]
    fn no_registration_returns_none() {
        let registry = FormatterRegistry::new();
        assert!(registry.formatter_for(&Value::Int(1)).is_none());
    }
}
