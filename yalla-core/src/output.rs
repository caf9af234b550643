//! Output sink abstraction, replacing direct `println!`/`eprintln!` calls so
//! that command execution and rendering can be exercised in tests without a
//! real terminal.

use std::io::{self, Write};

/// Stream a line of output is destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputChannel {
    Stdout,
    Stderr,
}

/// Sink commands and the renderer write to. Implementations decide whether
/// a write lands on a real terminal, is buffered for tests, or is routed
/// elsewhere entirely.
pub trait Output {
    fn write(&mut self, channel: OutputChannel, text: &str);

    fn write_line(&mut self, text: &str) {
        self.write(OutputChannel::Stdout, text);
        self.write(OutputChannel::Stdout, "\n");
    }

    fn error_line(&mut self, text: &str) {
        self.write(OutputChannel::Stderr, text);
        self.write(OutputChannel::Stderr, "\n");
    }
}

/// Writes directly to the process's stdout/stderr streams.
#[derive(Debug, Default)]
pub struct ConsoleOutput;

impl ConsoleOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Output for ConsoleOutput {
    fn write(&mut self, channel: OutputChannel, text: &str) {
        match channel {
            OutputChannel::Stdout => {
                let _ = write!(io::stdout(), "{text}");
                let _ = io::stdout().flush();
            }
            OutputChannel::Stderr => {
                let _ = write!(io::stderr(), "{text}");
                let _ = io::stderr().flush();
            }
        }
    }
}

/// Captures every completed line for inspection, used by unit and
/// integration tests in place of a real terminal.
#[derive(Debug, Default)]
pub struct BufferOutput {
    stdout_buf: String,
    stderr_buf: String,
    stdout_lines: Vec<String>,
    stderr_lines: Vec<String>,
}

impl BufferOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.stdout_lines
    }

    pub fn error_lines(&self) -> &[String] {
        &self.stderr_lines
    }

    pub fn all_lines(&self) -> Vec<String> {
        let mut combined = self.stdout_lines.clone();
        combined.extend(self.stderr_lines.clone());
        combined
    }
}

impl Output for BufferOutput {
    fn write(&mut self, channel: OutputChannel, text: &str) {
        let (buf, lines) = match channel {
            OutputChannel::Stdout => (&mut self.stdout_buf, &mut self.stdout_lines),
            OutputChannel::Stderr => (&mut self.stderr_buf, &mut self.stderr_lines),
        };
        buf.push_str(text);
        while let Some(pos) = buf.find('\n') {
            let line = buf[..pos].to_string();
            lines.push(line);
            buf.drain(..=pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_output_splits_on_newlines() {
        let mut out = BufferOutput::new();
        out.write_line("one");
        out.write_line("two");
        assert_eq!(out.lines(), &["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn buffer_output_keeps_stdout_and_stderr_separate() {
        let mut out = BufferOutput::new();
        out.write_line("ok");
        out.error_line("bad");
        assert_eq!(out.lines(), &["ok".to_string()]);
        assert_eq!(out.error_lines(), &["bad".to_string()]);
    }

    #[test]
    fn partial_write_without_newline_is_not_yet_a_line() {
        let mut out = BufferOutput::new();
        out.write(OutputChannel::Stdout, "partial");
        assert!(out.lines().is_empty());
        out.write(OutputChannel::Stdout, "\n");
        assert_eq!(out.lines(), &["partial".to_string()]);
    }
}
