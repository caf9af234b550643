//! Shared value types, the command surface, and the output abstraction used
//! by every other crate in this workspace.

pub mod command;
pub mod exit_code;
pub mod output;
pub mod value;

pub use command::{ArgSpec, Command, Input, OptionSpec};
pub use exit_code::{exit_code_for_io_error, ExitCode};
pub use output::{BufferOutput, ConsoleOutput, Output, OutputChannel};
pub use value::{OrderedMap, Value, TYPE_TAG_KEY};
