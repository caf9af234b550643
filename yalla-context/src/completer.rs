//! Completion providers registered by name (C4) and the aggregate candidate
//! contract the input reader (C2) pulls from.

use indexmap::IndexMap;
use std::sync::Arc;

/// A source of completion candidates for a given fragment.
pub trait Completer: Send + Sync {
    fn complete(&self, fragment: &str) -> Vec<String>;
}

/// The built-in library-function-name source (§4.3 candidate (a)): the
/// native expression DSL's callable builtins, kept in sync with
/// `yalla_repl::eval`'s builtin dispatch table by hand since `yalla-context`
/// sits below `yalla-repl` in the dependency graph and cannot import it.
pub struct LibrarySymbolCompleter;

impl Completer for LibrarySymbolCompleter {
    fn complete(&self, _fragment: &str) -> Vec<String> {
        ["len", "upper", "lower", "abs", "min", "max"].map(String::from).to_vec()
    }
}

#[derive(Default)]
pub struct CompleterRegistry {
    completers: IndexMap<String, Arc<dyn Completer>>,
}

impl CompleterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, completer: Arc<dyn Completer>) {
        self.completers.insert(name.into(), completer);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Completer>> {
        self.completers.get(name).map(Arc::clone)
    }

    /// Unranked candidates from every registered completer, for callers that
    /// want to merge them with other candidate sources before ranking.
    pub fn collect_candidates(&self, fragment: &str) -> Vec<String> {
        self.completers.values().flat_map(|completer| completer.complete(fragment)).collect()
    }

    /// Candidates from every registered completer, ranked by prefix match
    /// on `fragment` and capped at `max_suggestions` (§4.3).
    pub fn complete_all(&self, fragment: &str, max_suggestions: usize) -> Vec<String> {
        rank_candidates(self.collect_candidates(fragment), fragment, max_suggestions)
    }
}

/// Filters `candidates` to those starting with `fragment`, sorts, dedups,
/// and caps at `max_suggestions` (§4.3's "top N ranked by prefix match").
pub fn rank_candidates(candidates: Vec<String>, fragment: &str, max_suggestions: usize) -> Vec<String> {
    let mut candidates: Vec<String> =
        candidates.into_iter().filter(|candidate| candidate.starts_with(fragment)).collect();
    candidates.sort();
    candidates.dedup();
    candidates.truncate(max_suggestions);
    candidates
}
