//! Word-bounded, case-insensitive textual name expansion (§4.4, §9).
//!
//! Kept as dedicated, standalone functions (rather than inlined into
//! `process_input`) so a future tokenizer-based implementation can replace
//! just this module, per the "isolate it in a dedicated function" guidance
//! in SPEC_FULL.md §9.

use indexmap::IndexMap;

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn find_ci<'a>(map: &'a IndexMap<String, String>, word: &str) -> Option<&'a str> {
    map.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(word))
        .map(|(_, value)| value.as_str())
}

/// Expands shortcut aliases in one of three word-bounded forms:
/// `alias::`, `new<ws>alias`, `alias::class`. The first and third forms are
/// structurally identical (both are "alias immediately followed by `::`");
/// only the preceding-`new`-keyword form needs separate tracking.
pub fn expand_shortcuts(input: &str, shortcuts: &IndexMap<String, String>) -> String {
    if shortcuts.is_empty() {
        return input.to_string();
    }
    let chars: Vec<char> = input.chars().collect();
    let mut output = String::new();
    let mut i = 0;
    let mut last_word_lower: Option<String> = None;

    while i < chars.len() {
        if is_ident_start(chars[i]) {
            let start = i;
            while i < chars.len() && is_ident_continue(chars[i]) {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();

            let followed_by_scope = i + 1 < chars.len() && chars[i] == ':' && chars[i + 1] == ':';
            let preceded_by_new = last_word_lower.as_deref() == Some("new");

            match find_ci(shortcuts, &word) {
                Some(path) if followed_by_scope || preceded_by_new => output.push_str(path),
                _ => output.push_str(&word),
            }

            last_word_lower = Some(word.to_ascii_lowercase());
        } else {
            if !chars[i].is_whitespace() {
                last_word_lower = None;
            }
            output.push(chars[i]);
            i += 1;
        }
    }
    output
}

/// Expands namespace aliases: a word-bounded alias immediately followed by
/// `::` is replaced by its registered namespace prefix.
pub fn expand_namespaces(input: &str, namespaces: &IndexMap<String, String>) -> String {
    if namespaces.is_empty() {
        return input.to_string();
    }
    let chars: Vec<char> = input.chars().collect();
    let mut output = String::new();
    let mut i = 0;

    while i < chars.len() {
        if is_ident_start(chars[i]) {
            let start = i;
            while i < chars.len() && is_ident_continue(chars[i]) {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let followed_by_scope = i + 1 < chars.len() && chars[i] == ':' && chars[i + 1] == ':';

            match find_ci(namespaces, &word) {
                Some(prefix) if followed_by_scope => output.push_str(prefix),
                _ => output.push_str(&word),
            }
        } else {
            output.push(chars[i]);
            i += 1;
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn expands_alias_double_colon_form() {
        let shortcuts = map(&[("User", "App\\Models\\User")]);
        assert_eq!(
            expand_shortcuts("User::find(1)", &shortcuts),
            "App\\Models\\User::find(1)"
        );
    }

    #[test]
    fn expands_new_alias_form() {
        let shortcuts = map(&[("User", "App\\Models\\User")]);
        assert_eq!(
            expand_shortcuts("$u = new User", &shortcuts),
            "$u = new App\\Models\\User"
        );
    }

    #[test]
    fn expands_alias_class_form() {
        let shortcuts = map(&[("User", "App\\Models\\User")]);
        assert_eq!(
            expand_shortcuts("User::class", &shortcuts),
            "App\\Models\\User::class"
        );
    }

    #[test]
    fn does_not_expand_mid_identifier_substring() {
        let shortcuts = map(&[("User", "App\\Models\\User")]);
        assert_eq!(
            expand_shortcuts("SuperUserThing::find(1)", &shortcuts),
            "SuperUserThing::find(1)"
        );
    }

    #[test]
    fn match_is_case_insensitive() {
        let shortcuts = map(&[("User", "App\\Models\\User")]);
        assert_eq!(expand_shortcuts("user::find(1)", &shortcuts), "App\\Models\\User::find(1)");
    }

    #[test]
    fn bare_identifier_without_scope_or_new_is_untouched() {
        let shortcuts = map(&[("User", "App\\Models\\User")]);
        assert_eq!(expand_shortcuts("User", &shortcuts), "User");
    }

    #[test]
    fn namespace_expansion_rewrites_prefix() {
        let namespaces = map(&[("models", "App\\Models")]);
        assert_eq!(
            expand_namespaces("models::User::find(1)", &namespaces),
            "App\\Models::User::find(1)"
        );
    }
}
