//! REPL configuration (C3): a nested, dotted-path settings tree deep-merged
//! from built-in defaults and an optional user-supplied layer.
//!
//! Backed by `serde_json::Value` rather than a typed struct because §4.1
//! requires dotted-path `get`/`set` over an open-ended tree, not a fixed
//! schema. See DESIGN.md for why this departs from the teacher's typed
//! `merge.rs` while keeping its "merge is a pure function over two trees"
//! idiom.

mod error;

use serde_json::{json, Map, Value};
use std::path::Path;

pub use error::ConfigError;

/// Nested key/value configuration addressed by dotted paths.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplConfig {
    root: Value,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

impl ReplConfig {
    /// Built-in defaults recognized by every component (§4.1).
    pub fn defaults() -> Self {
        Self {
            root: json!({
                "extensions": [],
                "bootstrap": { "file": null, "files": [] },
                "shortcuts": {},
                "imports": [],
                "variables": {},
                "history": {
                    "enabled": true,
                    "file": default_history_file(),
                    "max_entries": 1000,
                    "ignore_duplicates": true,
                },
                "display": {
                    "colors": true,
                    "prompt": "[{counter}] yalla> ",
                    "welcome": Value::Null,
                    "goodbye": Value::Null,
                    "show_help": true,
                    "performance": false,
                    "stacktrace": false,
                    "mode": "compact",
                },
                "autocomplete": {
                    "enabled": true,
                    "min_chars": 2,
                    "max_suggestions": 10,
                },
                "security": {
                    "sandbox": false,
                    "blocked_functions": [],
                },
            }),
        }
    }

    /// Loads a TOML file at `path`, deep-merging it over [`Self::defaults`].
    /// A missing file is not an error: defaults are used as-is.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::defaults();
        let Some(path) = path else {
            return Ok(config);
        };
        if !path.exists() {
            return Ok(config);
        }
        let text = std::fs::read_to_string(path)?;
        let layer: Value = toml::from_str(&text)?;
        config.merge(&Self { root: layer });
        Ok(config)
    }

    /// Reads the value at `path`, returning `default` if any segment is
    /// missing. Never errors: unknown paths are not a failure (§4.1, §7).
    pub fn get(&self, path: &str, default: Value) -> Value {
        self.get_opt(path).cloned().unwrap_or(default)
    }

    /// Reads the value at `path` without a fallback.
    pub fn get_opt(&self, path: &str) -> Option<&Value> {
        let mut current = &self.root;
        for segment in split_path(path) {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Writes `value` at `path`, creating intermediate maps as needed and
    /// overwriting whatever was previously at the leaf.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        let segments: Vec<&str> = split_path(path).collect();
        if segments.is_empty() {
            return;
        }
        let mut current = root_as_object_mut(&mut self.root);
        for segment in &segments[..segments.len() - 1] {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = entry.as_object_mut().expect("just ensured object");
        }
        current.insert(segments[segments.len() - 1].to_string(), value.into());
    }

    /// Deep-merges `layer` over `self`: map values recurse, scalars and
    /// lists in `layer` replace the corresponding value in `self`.
    pub fn merge(&mut self, layer: &ReplConfig) {
        deep_merge(&mut self.root, &layer.root);
    }

    /// Exposes the whole tree, primarily for rendering/debug commands.
    pub fn as_value(&self) -> &Value {
        &self.root
    }
}

fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (base_slot, overlay_value) => {
            *base_slot = overlay_value.clone();
        }
    }
}

fn root_as_object_mut(root: &mut Value) -> &mut Map<String, Value> {
    if !root.is_object() {
        *root = Value::Object(Map::new());
    }
    root.as_object_mut().expect("just ensured object")
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|segment| !segment.is_empty())
}

fn default_history_file() -> String {
    dirs::home_dir()
        .map(|home| home.join(".yalla_history").to_string_lossy().to_string())
        .unwrap_or_else(|| ".yalla_history".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_on_known_default_path_never_returns_undefined() {
        let config = ReplConfig::defaults();
        assert_eq!(config.get("display.mode", Value::Null), json!("compact"));
        assert_eq!(
            config.get("history.max_entries", Value::Null),
            json!(1000)
        );
    }

    #[test]
    fn get_on_unknown_path_returns_supplied_default() {
        let config = ReplConfig::defaults();
        assert_eq!(config.get("nope.not.here", json!("fallback")), json!("fallback"));
    }

    #[test]
    fn set_then_get_roundtrips() {
        let mut config = ReplConfig::defaults();
        config.set("display.prompt", "custom> ");
        assert_eq!(config.get("display.prompt", Value::Null), json!("custom> "));
    }

    #[test]
    fn set_creates_intermediate_maps() {
        let mut config = ReplConfig::defaults();
        config.set("a.b.c", 42);
        assert_eq!(config.get("a.b.c", Value::Null), json!(42));
    }

    #[test]
    fn merge_preserves_unoverridden_leaves_and_replaces_overridden_ones() {
        let mut base = ReplConfig::defaults();
        base.set("display.mode", "verbose");
        base.set("display.colors", true);

        let mut overlay = ReplConfig {
            root: json!({}),
        };
        overlay.set("display.mode", "json");

        base.merge(&overlay);

        assert_eq!(base.get("display.mode", Value::Null), json!("json"));
        assert_eq!(base.get("display.colors", Value::Null), json!(true));
    }

    #[test]
    fn merge_recurses_into_nested_maps_rather_than_replacing_them() {
        let mut base = ReplConfig::defaults();
        base.set("shortcuts.User", "App\\Models\\User");

        let mut overlay = ReplConfig { root: json!({}) };
        overlay.set("shortcuts.Post", "App\\Models\\Post");

        base.merge(&overlay);

        assert_eq!(
            base.get("shortcuts.User", Value::Null),
            json!("App\\Models\\User")
        );
        assert_eq!(
            base.get("shortcuts.Post", Value::Null),
            json!("App\\Models\\Post")
        );
    }

    #[test]
    fn load_with_no_path_returns_defaults() {
        let config = ReplConfig::load(None).unwrap();
        assert_eq!(config, ReplConfig::defaults());
    }

    #[test]
    fn load_with_missing_file_returns_defaults() {
        let config = ReplConfig::load(Some(Path::new("/nonexistent/repl.config.toml"))).unwrap();
        assert_eq!(config, ReplConfig::defaults());
    }

    #[test]
    fn load_merges_file_contents_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repl.config.toml");
        std::fs::write(&path, "[display]\nmode = \"json\"\n").unwrap();

        let config = ReplConfig::load(Some(&path)).unwrap();
        assert_eq!(config.get("display.mode", Value::Null), json!("json"));
        assert_eq!(config.get("display.colors", Value::Null), json!(true));
    }
}
