//! REPL context (C4): the single process-lifetime registry of shortcuts,
//! imports, namespaces, variables, commands, evaluators, formatters,
//! completers, and middleware described in §3/§4.4.

pub mod commands;
pub mod completer;
pub mod evaluator;
pub mod formatter;
pub mod repl_middleware;
pub mod shortcuts;
pub mod similarity;

use commands::{
    ClearCommand, ExitCommand, HelpCommand, HistoryCommand, ImportsCommand, ModeCommand,
    ReplCommand, VarsCommand,
};
use completer::{rank_candidates, Completer, CompleterRegistry, LibrarySymbolCompleter};
use evaluator::{Evaluator, EvaluatorRegistry};
use formatter::{Formatter, FormatterRegistry};
use indexmap::IndexMap;
use repl_middleware::{InputMiddleware, OutputMiddleware, ReplMiddlewareChain};
use similarity::similarity_ratio;
use std::sync::{Arc, Mutex, Weak};
use yalla_core::Value;
use yalla_history::History;

/// Minimum similarity ratio (§4.5, §8) for suggesting a command name when
/// an unknown `:cmd` is typed.
pub const SUGGESTION_THRESHOLD: f64 = 0.5;

pub struct ReplContext {
    shortcuts: IndexMap<String, String>,
    imports: IndexMap<String, String>,
    namespaces: IndexMap<String, String>,
    variables: IndexMap<String, Value>,
    commands: IndexMap<String, Arc<dyn ReplCommand>>,
    evaluators: EvaluatorRegistry,
    formatters: FormatterRegistry,
    completers: CompleterRegistry,
    middleware: ReplMiddlewareChain,
    history: Option<Weak<Mutex<History>>>,
    display_mode: String,
    signals_available: bool,
}

impl Default for ReplContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplContext {
    pub fn new() -> Self {
        let mut ctx = Self {
            shortcuts: IndexMap::new(),
            imports: IndexMap::new(),
            namespaces: IndexMap::new(),
            variables: IndexMap::new(),
            commands: IndexMap::new(),
            evaluators: EvaluatorRegistry::new(),
            formatters: FormatterRegistry::new(),
            completers: CompleterRegistry::new(),
            middleware: ReplMiddlewareChain::new(),
            history: None,
            display_mode: "compact".to_string(),
            signals_available: true,
        };
        ctx.register_builtin_commands();
        ctx.register_completer("library_symbols", Arc::new(LibrarySymbolCompleter));
        ctx
    }

    fn register_builtin_commands(&mut self) {
        self.register_command("help", Arc::new(HelpCommand));
        self.register_command("exit", Arc::new(ExitCommand));
        self.register_command("clear", Arc::new(ClearCommand));
        self.register_command("history", Arc::new(HistoryCommand));
        self.register_command("vars", Arc::new(VarsCommand));
        self.register_command("imports", Arc::new(ImportsCommand));
        self.register_command("mode", Arc::new(ModeCommand));
    }

    // -- shortcuts / imports / namespaces --------------------------------

    /// Idempotent over identical inputs (§3 invariant).
    pub fn add_shortcut(&mut self, alias: impl Into<String>, path: impl Into<String>) -> &mut Self {
        self.shortcuts.insert(alias.into(), path.into());
        self
    }

    pub fn add_import(&mut self, local: impl Into<String>, path: impl Into<String>) -> &mut Self {
        self.imports.insert(local.into(), path.into());
        self
    }

    pub fn add_namespace(&mut self, alias: impl Into<String>, prefix: impl Into<String>) -> &mut Self {
        self.namespaces.insert(alias.into(), prefix.into());
        self
    }

    pub fn imports(&self) -> &IndexMap<String, String> {
        &self.imports
    }

    pub fn shortcuts(&self) -> &IndexMap<String, String> {
        &self.shortcuts
    }

    // -- variables --------------------------------------------------------

    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.variables.insert(name.into(), value);
        self
    }

    pub fn get_variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn variables(&self) -> &IndexMap<String, Value> {
        &self.variables
    }

    // -- commands -----------------------------------------------------------

    pub fn register_command(&mut self, name: impl Into<String>, handler: Arc<dyn ReplCommand>) -> &mut Self {
        self.commands.insert(name.into(), handler);
        self
    }

    pub fn command_names(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Names whose similarity ratio to `typed` exceeds [`SUGGESTION_THRESHOLD`]
    /// (§4.5, §8), most similar first.
    pub fn suggest_commands(&self, typed: &str) -> Vec<String> {
        let mut scored: Vec<(f64, &str)> = self
            .commands
            .keys()
            .map(|name| (similarity_ratio(typed, name), name.as_str()))
            .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().map(|(_, name)| name.to_string()).collect()
    }

    /// Dispatches `name` with `args`. Returns `None` if unknown. The bool is
    /// the handler's "keep running" signal (`false` terminates the session).
    pub fn dispatch_command(
        &mut self,
        name: &str,
        args: &[String],
        output: &mut dyn yalla_core::Output,
    ) -> Option<bool> {
        let handler = Arc::clone(self.commands.get(name)?);
        Some(handler.execute(args, output, self))
    }

    // -- evaluators ---------------------------------------------------------

    pub fn add_evaluator(&mut self, evaluator: Arc<dyn Evaluator>, priority: i32) -> &mut Self {
        self.evaluators.add(evaluator, priority);
        self
    }

    pub fn try_evaluate(&self, input: &str) -> Option<Value> {
        self.evaluators.try_evaluate(input)
    }

    pub fn evaluator_names(&self) -> Vec<&str> {
        self.evaluators.names_in_order()
    }

    // -- formatters -----------------------------------------------------------

    pub fn register_formatter(&mut self, type_spec: impl Into<String>, formatter: Arc<dyn Formatter>) -> &mut Self {
        self.formatters.register(type_spec, formatter);
        self
    }

    pub fn register_formatter_ancestor(&mut self, child: impl Into<String>, parent: impl Into<String>) -> &mut Self {
        self.formatters.register_ancestor(child, parent);
        self
    }

    pub fn formatter_for(&self, value: &Value) -> Option<Arc<dyn Formatter>> {
        self.formatters.formatter_for(value)
    }

    // -- completers -----------------------------------------------------------

    pub fn register_completer(&mut self, name: impl Into<String>, completer: Arc<dyn Completer>) -> &mut Self {
        self.completers.register(name, completer);
        self
    }

    /// Aggregates the four §4.3 candidate sources: registered completers
    /// (library symbols, plus anything a caller added), `$`-sigil variable
    /// names, shortcut names, and `:`-prefixed command names — all owned
    /// directly by this context, read live rather than snapshotted.
    pub fn complete(&self, fragment: &str, max_suggestions: usize) -> Vec<String> {
        let mut candidates = self.completers.collect_candidates(fragment);
        candidates.extend(self.variables.keys().map(|name| format!("${name}")));
        candidates.extend(self.shortcuts.keys().cloned());
        candidates.extend(self.commands.keys().map(|name| format!(":{name}")));
        rank_candidates(candidates, fragment, max_suggestions)
    }

    // -- middleware -----------------------------------------------------------

    pub fn add_input_middleware(&mut self, middleware: Arc<dyn InputMiddleware>) -> &mut Self {
        self.middleware.add_input(middleware);
        self
    }

    pub fn add_output_middleware(&mut self, middleware: Arc<dyn OutputMiddleware>) -> &mut Self {
        self.middleware.add_output(middleware);
        self
    }

    /// Input preprocessing (§4.4): middleware, then shortcut expansion,
    /// then namespace-alias expansion.
    pub fn process_input(&self, input: &str) -> String {
        let after_middleware = self.middleware.apply_input(input.to_string());
        let after_shortcuts = shortcuts::expand_shortcuts(&after_middleware, &self.shortcuts);
        shortcuts::expand_namespaces(&after_shortcuts, &self.namespaces)
    }

    pub fn process_output(&self, value: Value) -> Value {
        self.middleware.apply_output(value)
    }

    // -- history --------------------------------------------------------------

    pub fn set_history(&mut self, history: &Arc<Mutex<History>>) {
        self.history = Some(Arc::downgrade(history));
    }

    pub fn history(&self) -> Option<Arc<Mutex<History>>> {
        self.history.as_ref().and_then(Weak::upgrade)
    }

    // -- display mode / signal availability ------------------------------------

    pub fn display_mode(&self) -> &str {
        &self.display_mode
    }

    pub fn set_display_mode(&mut self, mode: impl Into<String>) {
        self.display_mode = mode.into();
    }

    pub fn signals_available(&self) -> bool {
        self.signals_available
    }

    pub fn set_signals_available(&mut self, available: bool) {
        self.signals_available = available;
    }
}
