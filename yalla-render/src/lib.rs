//! Value rendering (C6): four display modes driven by `display.mode`,
//! color-graded the way the grounding repository's `OutputFormatter`
//! color-grades its success/warning/error lines.

pub mod color;
pub mod mode;
pub mod perf;

pub use mode::{DisplayMode, UnknownDisplayMode};
pub use perf::perf_line;

use yalla_core::{Output, OutputChannel, OrderedMap, Value};

const VERBOSE_TRUNCATE_AT: usize = 20;
const STRING_TRUNCATE_AT: usize = 50;

pub struct Renderer {
    mode: DisplayMode,
    colors_enabled: bool,
}

impl Renderer {
    pub fn new(mode: DisplayMode, colors_enabled: bool) -> Self {
        Self { mode, colors_enabled }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DisplayMode) {
        self.mode = mode;
    }

    /// Renders `value` per the active mode and writes the result to
    /// `output`'s stdout channel.
    pub fn render(&self, value: &Value, output: &mut dyn Output) {
        let rendered = self.render_to_string(value);
        output.write(OutputChannel::Stdout, &rendered);
        output.write(OutputChannel::Stdout, "\n");
    }

    pub fn render_to_string(&self, value: &Value) -> String {
        match self.mode {
            DisplayMode::Compact => render_compact(value, self.colors_enabled),
            DisplayMode::Verbose => render_verbose(value, self.colors_enabled),
            DisplayMode::Json => render_json(value),
            DisplayMode::Dump => render_dump(value),
        }
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let truncated: String = s.chars().take(max).collect();
        format!("{truncated}\u{2026}")
    } else {
        s.to_string()
    }
}

fn render_compact(value: &Value, colors: bool) -> String {
    match value {
        Value::Null => color::dim(colors, "null"),
        Value::Bool(true) => color::green(colors, "true"),
        Value::Bool(false) => color::red(colors, "false"),
        Value::Int(i) => color::yellow(colors, &i.to_string()),
        Value::Float(f) => color::yellow(colors, &f.to_string()),
        Value::Str(s) => color::green(colors, &format!("\"{}\"", truncate_chars(s, STRING_TRUNCATE_AT))),
        Value::List(items) => render_compact_list(items, colors),
        Value::Map(map) => render_compact_map(map, colors),
    }
}

fn is_associative_list(items: &[Value]) -> bool {
    !items.is_empty() && items.iter().all(|v| matches!(v, Value::Map(_)))
}

fn shares_key_structure(items: &[Value]) -> bool {
    let mut maps = items.iter().filter_map(|v| match v {
        Value::Map(m) => Some(m.keys().cloned().collect::<Vec<_>>()),
        _ => None,
    });
    match maps.next() {
        None => false,
        Some(first_keys) => maps.all(|keys| keys == first_keys),
    }
}

fn render_tabular(items: &[Value], colors: bool) -> String {
    let Value::Map(first) = &items[0] else {
        return render_multiline_list(items, colors);
    };
    let headers: Vec<&String> = first.keys().collect();
    let mut lines = vec![headers.iter().map(|h| h.as_str()).collect::<Vec<_>>().join(" | ")];
    for item in items {
        if let Value::Map(m) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| m.get(h.as_str()).map_or_else(|| color::dim(colors, "null"), |v| render_compact(v, colors)))
                .collect();
            lines.push(row.join(" | "));
        }
    }
    lines.join("\n")
}

fn render_multiline_list(items: &[Value], colors: bool) -> String {
    let mut lines = vec!["[".to_string()];
    for (i, item) in items.iter().enumerate() {
        lines.push(format!("  {i}: {}", render_compact(item, colors)));
    }
    lines.push("]".to_string());
    lines.join("\n")
}

fn render_compact_list(items: &[Value], colors: bool) -> String {
    if items.is_empty() {
        return "[]".to_string();
    }
    if items.len() <= 3 && !is_associative_list(items) {
        let inner: Vec<String> = items.iter().map(|v| render_compact(v, colors)).collect();
        format!("[{}]", inner.join(", "))
    } else if is_associative_list(items) && shares_key_structure(items) {
        render_tabular(items, colors)
    } else {
        render_multiline_list(items, colors)
    }
}

fn render_compact_map(map: &OrderedMap, colors: bool) -> String {
    if map.is_empty() {
        return "{}".to_string();
    }
    if map.len() <= 3 {
        let inner: Vec<String> = map
            .iter()
            .map(|(k, v)| format!("{k}: {}", render_compact(v, colors)))
            .collect();
        format!("{{{}}}", inner.join(", "))
    } else {
        let mut lines = vec!["{".to_string()];
        for (k, v) in map {
            lines.push(format!("  {k}: {}", render_compact(v, colors)));
        }
        lines.push("}".to_string());
        lines.join("\n")
    }
}

fn render_verbose(value: &Value, colors: bool) -> String {
    match value {
        Value::List(items) => {
            let mut lines = vec![color::bold(colors, &format!("list ({} items)", items.len()))];
            for (i, item) in items.iter().take(VERBOSE_TRUNCATE_AT).enumerate() {
                lines.push(format!("  [{i}] => {}", render_compact(item, colors)));
            }
            if items.len() > VERBOSE_TRUNCATE_AT {
                lines.push(format!("  ... {} more", items.len() - VERBOSE_TRUNCATE_AT));
            }
            lines.join("\n")
        }
        Value::Map(map) => {
            let declared = value.declared_type();
            let mut lines = vec![color::bold(colors, &format!("{declared} ({} fields)", map.len()))];
            let fields: Vec<(&String, &Value)> = map
                .iter()
                .filter(|(k, _)| k.as_str() != yalla_core::TYPE_TAG_KEY)
                .collect();
            for (k, v) in fields.iter().take(VERBOSE_TRUNCATE_AT) {
                lines.push(format!("  {k} => {}", render_compact(v, colors)));
            }
            if fields.len() > VERBOSE_TRUNCATE_AT {
                lines.push(format!("  ... {} more", fields.len() - VERBOSE_TRUNCATE_AT));
            }
            lines.join("\n")
        }
        other => render_compact(other, colors),
    }
}

/// Canonical pretty JSON. Falls back to compact rendering if serialization
/// fails (§4.6) — `Value` only ever holds JSON-representable data so this
/// is unreachable in practice, but the fallback is specified explicitly.
fn render_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| render_compact(value, false))
}

fn render_dump(value: &Value) -> String {
    match value {
        Value::Null => "Null".to_string(),
        Value::Bool(b) => format!("Bool({b})"),
        Value::Int(i) => format!("Int({i})"),
        Value::Float(f) => format!("Float({f})"),
        Value::Str(s) => format!("Str({s:?})"),
        Value::List(items) => {
            let inner: Vec<String> = items.iter().map(render_dump).collect();
            format!("List[\n{}\n]", indent(&inner.join(",\n")))
        }
        Value::Map(map) => {
            let inner: Vec<String> = map.iter().map(|(k, v)| format!("{k:?} => {}", render_dump(v))).collect();
            format!("Map{{\n{}\n}}", indent(&inner.join(",\n")))
        }
    }
}

fn indent(block: &str) -> String {
    block.lines().map(|line| format!("  {line}")).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_null_is_dim() {
        assert_eq!(render_compact(&Value::Null, true), "\x1b[2mnull\x1b[0m");
    }

    #[test]
    fn compact_string_truncates_past_fifty_chars() {
        let long = "a".repeat(60);
        let rendered = render_compact(&Value::Str(long), false);
        assert!(rendered.contains('\u{2026}'));
    }

    #[test]
    fn compact_short_scalar_list_is_inline() {
        let list = Value::List(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(render_compact(&list, false), "[1, 2]");
    }

    #[test]
    fn compact_uniform_map_list_renders_tabular() {
        let mut row1 = OrderedMap::new();
        row1.insert("id".into(), Value::Int(1));
        row1.insert("name".into(), Value::Str("a".into()));
        let mut row2 = OrderedMap::new();
        row2.insert("id".into(), Value::Int(2));
        row2.insert("name".into(), Value::Str("b".into()));
        let list = Value::List(vec![Value::Map(row1), Value::Map(row2)]);

        let rendered = render_compact(&list, false);
        assert_eq!(rendered.lines().next(), Some("id | name"));
    }

    #[test]
    fn compact_long_scalar_list_is_multiline() {
        let list = Value::List((0..5).map(Value::Int).collect());
        let rendered = render_compact(&list, false);
        assert!(rendered.starts_with("[\n"));
    }

    #[test]
    fn json_mode_serializes_canonically() {
        let value = Value::List(vec![Value::Int(1), Value::Bool(true)]);
        let rendered = render_json(&value);
        assert_eq!(rendered, "[\n  1,\n  true\n]");
    }

    #[test]
    fn dump_mode_tags_primitive_types() {
        assert_eq!(render_dump(&Value::Int(5)), "Int(5)");
        assert_eq!(render_dump(&Value::Str("x".into())), "Str(\"x\")");
    }

    #[test]
    fn verbose_mode_reports_declared_type_and_truncates() {
        let mut tagged = OrderedMap::new();
        tagged.insert(yalla_core::TYPE_TAG_KEY.to_string(), Value::Str("User".into()));
        for i in 0..25 {
            tagged.insert(format!("field{i}"), Value::Int(i));
        }
        let rendered = render_verbose(&Value::Map(tagged), false);
        assert!(rendered.contains("User (25 fields)"));
        assert!(rendered.contains("... 5 more"));
    }
}
