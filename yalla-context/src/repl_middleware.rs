//! REPL-level input/output middleware (C4): two ordered phases distinct
//! from the command-execution middleware pipeline in `yalla-middleware`
//! (C7). Applied in plain insertion order (§3, §4.4), not priority order.

use std::sync::Arc;
use yalla_core::Value;

pub trait InputMiddleware: Send + Sync {
    fn apply(&self, input: String) -> String;
}

pub trait OutputMiddleware: Send + Sync {
    fn apply(&self, value: Value) -> Value;
}

#[derive(Default)]
pub struct ReplMiddlewareChain {
    input: Vec<Arc<dyn InputMiddleware>>,
    output: Vec<Arc<dyn OutputMiddleware>>,
}

impl ReplMiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_input(&mut self, middleware: Arc<dyn InputMiddleware>) {
        self.input.push(middleware);
    }

    pub fn add_output(&mut self, middleware: Arc<dyn OutputMiddleware>) {
        self.output.push(middleware);
    }

    pub fn apply_input(&self, mut data: String) -> String {
        for middleware in &self.input {
            data = middleware.apply(data);
        }
        data
    }

    pub fn apply_output(&self, mut value: Value) -> Value {
        for middleware in &self.output {
            value = middleware.apply(value);
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Trim;
    impl InputMiddleware for Trim {
        fn apply(&self, input: String) -> String {
            input.trim().to_string()
        }
    }

    struct Shout;
    impl InputMiddleware for Shout {
        fn apply(&self, input: String) -> String {
            input.to_uppercase()
        }
    }

    #[test]
    fn input_middleware_applies_in_insertion_order() {
        let mut chain = ReplMiddlewareChain::new();
        chain.add_input(Arc::new(Trim));
        chain.add_input(Arc::new(Shout));
        assert_eq!(chain.apply_input("  hi  ".to_string()), "HI");
    }
}
