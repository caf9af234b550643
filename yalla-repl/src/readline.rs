//! Input reader (C2): a `rustyline::Editor` wired to a crate-local
//! `Helper`, the same substrate as `llmspell-kernel::repl::readline`.
//!
//! Departs from the grounding repository in one deliberate way (§4.3): the
//! `Validator` here reports `Incomplete` for unbalanced brackets or an
//! unterminated string, so the reader itself participates in multiline
//! accumulation rather than the session re-implementing bracket counting.
//! The teacher's own `Validator::validate` is a permanent `Ok(Valid(None))`
//! and leaves that heuristic entirely to `session.rs`.

use rustyline::completion::{Completer as RlCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::FileHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Config, Editor};
use rustyline::{Context, Helper};
use std::borrow::Cow;
use std::sync::{Arc, Mutex};
use yalla_context::ReplContext;

use crate::eval::looks_incomplete;

/// Sentinel returned by [`InputReader::read_line`] when the terminal
/// closes (Ctrl-D on an empty line), per §4.3.
pub const END_OF_INPUT: &str = "\u{0}__yalla_eof__\u{0}";

struct ReplHelper {
    context: Arc<Mutex<ReplContext>>,
    max_suggestions: usize,
}

impl RlCompleter for ReplHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = line[..pos].rfind(|c: char| c.is_whitespace()).map_or(0, |i| i + 1);
        let fragment = &line[start..pos];
        let context = self.context.lock().unwrap_or_else(|e| e.into_inner());
        let candidates = context
            .complete(fragment, self.max_suggestions)
            .into_iter()
            .map(|candidate| Pair { display: candidate.clone(), replacement: candidate })
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos != line.len() || line.is_empty() {
            return None;
        }
        let context = self.context.lock().unwrap_or_else(|e| e.into_inner());
        let matches = context.complete(line, 1);
        matches.first().map(|m| m[line.len()..].to_string())
    }
}

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for ReplHelper {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        if looks_incomplete(ctx.input()) {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

impl Helper for ReplHelper {}

/// Wraps a `rustyline::Editor` configured the way
/// `llmspell-kernel::repl::readline::ReplReadline` configures its own,
/// plus the context-driven completion/validation wiring above.
pub struct InputReader {
    editor: Editor<ReplHelper, FileHistory>,
}

impl InputReader {
    pub fn new(context: Arc<Mutex<ReplContext>>, max_suggestions: usize) -> rustyline::Result<Self> {
        let config = Config::builder()
            .history_ignore_space(true)
            .history_ignore_dups(true)
            .expect("static config value is always valid")
            .completion_type(rustyline::CompletionType::List)
            .edit_mode(rustyline::EditMode::Emacs)
            .auto_add_history(false)
            .max_history_size(10_000)
            .expect("static config value is always valid")
            .build();
        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(ReplHelper { context, max_suggestions }));
        Ok(Self { editor })
    }

    /// Reads one line, prompting with `prompt`. Returns [`END_OF_INPUT`] on
    /// Ctrl-D; an interrupted read (Ctrl-C) is reported as an empty line so
    /// the session's signal handling — not the reader — owns the
    /// interrupt response.
    pub fn read_line(&mut self, prompt: &str) -> rustyline::Result<String> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(line),
            Err(ReadlineError::Interrupted) => Ok(String::new()),
            Err(ReadlineError::Eof) => Ok(END_OF_INPUT.to_string()),
            Err(e) => Err(e),
        }
    }

    pub fn add_history_entry(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }

    pub fn load_history(&mut self, path: &std::path::Path) {
        if self.editor.load_history(path).is_err() {
            tracing::debug!(?path, "no existing rustyline history file to load");
        }
    }

    pub fn save_history(&mut self, path: &std::path::Path) {
        if let Err(e) = self.editor.save_history(path) {
            tracing::warn!(?path, error = %e, "failed to persist rustyline history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_constructs_with_a_fresh_context() {
        let context = Arc::new(Mutex::new(ReplContext::new()));
        assert!(InputReader::new(context, 10).is_ok());
    }
}
