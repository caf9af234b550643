//! Built-in REPL commands registered at context construction (§4.4).

use crate::ReplContext;
use yalla_core::Output;

/// A `:name args...` command handler. Returns `false` to terminate the
/// session, mirroring the distilled spec's "a `false` return terminates
/// the session" contract.
pub trait ReplCommand: Send + Sync {
    fn execute(&self, args: &[String], output: &mut dyn Output, ctx: &mut ReplContext) -> bool;
}

pub struct HelpCommand;
impl ReplCommand for HelpCommand {
    fn execute(&self, _args: &[String], output: &mut dyn Output, ctx: &mut ReplContext) -> bool {
        output.write_line("Available commands:");
        for name in ctx.command_names() {
            output.write_line(&format!("  :{name}"));
        }
        if !ctx.signals_available() {
            output.write_line(
                "(signal handling is unavailable on this platform; :exit is the only way to stop a long-running evaluation)",
            );
        }
        true
    }
}

pub struct ExitCommand;
impl ReplCommand for ExitCommand {
    fn execute(&self, _args: &[String], _output: &mut dyn Output, _ctx: &mut ReplContext) -> bool {
        false
    }
}

pub struct ClearCommand;
impl ReplCommand for ClearCommand {
    fn execute(&self, _args: &[String], output: &mut dyn Output, _ctx: &mut ReplContext) -> bool {
        output.write(yalla_core::OutputChannel::Stdout, "\x1B[2J\x1B[H");
        true
    }
}

pub struct HistoryCommand;
impl ReplCommand for HistoryCommand {
    fn execute(&self, _args: &[String], output: &mut dyn Output, ctx: &mut ReplContext) -> bool {
        if let Some(history) = ctx.history() {
            let history = history.lock().unwrap_or_else(|e| e.into_inner());
            for (i, entry) in history.all().iter().enumerate() {
                output.write_line(&format!("{:4}  {entry}", i + 1));
            }
        } else {
            output.write_line("(history is disabled)");
        }
        true
    }
}

pub struct VarsCommand;
impl ReplCommand for VarsCommand {
    fn execute(&self, _args: &[String], output: &mut dyn Output, ctx: &mut ReplContext) -> bool {
        for (name, value) in ctx.variables() {
            output.write_line(&format!("${name} = {value}"));
        }
        true
    }
}

pub struct ImportsCommand;
impl ReplCommand for ImportsCommand {
    fn execute(&self, _args: &[String], output: &mut dyn Output, ctx: &mut ReplContext) -> bool {
        for (local, path) in ctx.imports() {
            output.write_line(&format!("{local} => {path}"));
        }
        true
    }
}

pub struct ModeCommand;
impl ReplCommand for ModeCommand {
    fn execute(&self, args: &[String], output: &mut dyn Output, ctx: &mut ReplContext) -> bool {
        const ALLOWED: [&str; 4] = ["compact", "verbose", "json", "dump"];
        match args.first() {
            None => {
                output.write_line(&format!("current mode: {}", ctx.display_mode()));
            }
            Some(requested) if ALLOWED.contains(&requested.as_str()) => {
                ctx.set_display_mode(requested);
                output.write_line(&format!("mode set to {requested}"));
            }
            Some(other) => {
                output.error_line(&format!(
                    "unknown display mode '{other}', expected one of: {}",
                    ALLOWED.join(", ")
                ));
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yalla_core::BufferOutput;

    #[test]
    fn exit_command_terminates() {
        let mut ctx = ReplContext::new();
        let mut out = BufferOutput::new();
        let keep_running = ExitCommand.execute(&[], &mut out, &mut ctx);
        assert!(!keep_running);
    }

    #[test]
    fn mode_command_rejects_unknown_mode() {
        let mut ctx = ReplContext::new();
        let mut out = BufferOutput::new();
        ModeCommand.execute(&["nonsense".to_string()], &mut out, &mut ctx);
        assert_eq!(
            out.error_lines(),
            &["unknown display mode 'nonsense', expected one of: compact, verbose, json, dump"
                .to_string()]
        );
    }

    #[test]
    fn mode_command_accepts_known_mode() {
        let mut ctx = ReplContext::new();
        let mut out = BufferOutput::new();
        ModeCommand.execute(&["json".to_string()], &mut out, &mut ctx);
        assert_eq!(ctx.display_mode(), "json");
    }
}
