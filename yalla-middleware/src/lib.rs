//! Command-execution middleware pipeline (C7): priority-ordered handlers
//! wrapped around a command's own `execute`, each able to inspect or
//! transform the input/output, call `next` zero or more times, and compose
//! its return value with the inner result.

pub mod priority;

use std::sync::Arc;
use yalla_core::{Command, Input, Output};

pub type HandlerId = usize;

/// One link in the onion. Receives the remaining chain as `next` and
/// decides whether (and how many times) to invoke it.
pub trait MiddlewareHandler: Send + Sync {
    fn name(&self) -> &str;
    fn handle(&self, command: &dyn Command, input: &Input, output: &mut dyn Output, next: Next<'_>) -> i32;
}

/// The remaining chain, from the perspective of the handler currently
/// executing. Calling it invokes the next handler, or the command itself
/// once the chain is exhausted.
pub struct Next<'a> {
    remaining: &'a [(HandlerId, i32, Arc<dyn MiddlewareHandler>)],
    command: &'a dyn Command,
}

impl<'a> Next<'a> {
    pub fn call(&self, input: &Input, output: &mut dyn Output) -> i32 {
        match self.remaining.split_first() {
            Some(((_, _, handler), rest)) => {
                let next = Next { remaining: rest, command: self.command };
                handler.handle(self.command, input, output, next)
            }
            None => self.command.execute(input, output),
        }
    }
}

#[derive(Default)]
pub struct MiddlewarePipeline {
    handlers: Vec<(HandlerId, i32, Arc<dyn MiddlewareHandler>)>,
    next_id: HandlerId,
}

impl MiddlewarePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` at `priority`. Re-sorts by priority descending,
    /// stable on ties, so equal-priority handlers run in registration
    /// order.
    pub fn add(&mut self, handler: Arc<dyn MiddlewareHandler>, priority: i32) -> HandlerId {
        let id = self.next_id;
        self.next_id += 1;
        self.handlers.push((id, priority, handler));
        self.handlers.sort_by(|a, b| b.1.cmp(&a.1));
        id
    }

    pub fn add_many(&mut self, handlers: Vec<(Arc<dyn MiddlewareHandler>, i32)>) -> Vec<HandlerId> {
        handlers.into_iter().map(|(handler, priority)| self.add(handler, priority)).collect()
    }

    pub fn remove(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _, _)| *handler_id != id);
        self.handlers.len() != before
    }

    pub fn count(&self) -> usize {
        self.handlers.len()
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    /// Runs the full onion around `command`, innermost step being the
    /// command's own `execute`.
    pub fn execute(&self, command: &dyn Command, input: &Input, output: &mut dyn Output) -> i32 {
        let next = Next { remaining: &self.handlers, command };
        next.call(input, output)
    }
}
