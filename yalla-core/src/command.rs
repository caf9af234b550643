//! The command surface (C11): a declared argument/option shape and an
//! `execute(input, output) -> int` contract shared by the REPL and the CLI
//! dispatcher.

use crate::output::Output;
use crate::value::Value;
use indexmap::IndexMap;

/// Declaration of a single positional argument.
#[derive(Debug, Clone)]
pub struct ArgSpec {
    pub name: String,
    pub description: String,
    pub required: bool,
}

impl ArgSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
        }
    }
}

/// Declaration of a single named option.
#[derive(Debug, Clone)]
pub struct OptionSpec {
    pub long: String,
    pub short: Option<char>,
    pub description: String,
    pub default: Option<Value>,
}

impl OptionSpec {
    pub fn new(long: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            long: long.into(),
            short: None,
            description: description.into(),
            default: None,
        }
    }

    pub fn with_short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// The record passed to `Command::execute`.
///
/// Invariant (§3): for every declared option with a short name, both the
/// long and short key are bound to the same value.
#[derive(Debug, Clone, Default)]
pub struct Input {
    pub command: String,
    pub arguments: Vec<String>,
    pub options: IndexMap<String, Value>,
}

impl Input {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            arguments: Vec::new(),
            options: IndexMap::new(),
        }
    }

    pub fn with_arguments(mut self, arguments: Vec<String>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Binds both long and short keys to `value`, satisfying the option
    /// mirroring invariant from §3.
    pub fn set_option(&mut self, spec: &OptionSpec, value: Value) {
        self.options.insert(spec.long.clone(), value.clone());
        if let Some(short) = spec.short {
            self.options.insert(short.to_string(), value);
        }
    }

    pub fn argument(&self, index: usize) -> Option<&str> {
        self.arguments.get(index).map(String::as_str)
    }

    /// Reads a named argument declared in `spec`, by position, falling back
    /// to `default` when absent (helper accessor required by §4.11).
    pub fn argument_or<'a>(&'a self, index: usize, default: &'a str) -> &'a str {
        self.argument(index).unwrap_or(default)
    }

    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }

    pub fn option_or<'a>(&'a self, name: &str, default: &'a Value) -> &'a Value {
        self.option(name).unwrap_or(default)
    }
}

/// Abstract operation: declares its shape and knows how to execute itself
/// against an [`Input`] and an [`Output`] sink.
pub trait Command {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    fn arguments(&self) -> &[ArgSpec] {
        &[]
    }

    fn options(&self) -> &[OptionSpec] {
        &[]
    }

    fn execute(&self, input: &Input, output: &mut dyn Output) -> i32;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::BufferOutput;

    struct Echo;

    impl Command for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "echoes its first argument"
        }
        fn arguments(&self) -> &[ArgSpec] {
            &[]
        }
        fn execute(&self, input: &Input, output: &mut dyn Output) -> i32 {
            output.write_line(input.argument_or(0, ""));
            0
        }
    }

    #[test]
    fn option_mirroring_binds_both_keys() {
        let spec = OptionSpec::new("verbose", "be verbose").with_short('v');
        let mut input = Input::new("x");
        input.set_option(&spec, Value::Bool(true));
        assert_eq!(input.option("verbose"), Some(&Value::Bool(true)));
        assert_eq!(input.option("v"), Some(&Value::Bool(true)));
    }

    #[test]
    fn command_execute_writes_to_output() {
        let cmd = Echo;
        let input = Input::new("echo").with_arguments(vec!["hi".to_string()]);
        let mut out = BufferOutput::new();
        let code = cmd.execute(&input, &mut out);
        assert_eq!(code, 0);
        assert_eq!(out.lines(), &["hi".to_string()]);
    }
}
