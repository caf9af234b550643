//! Argument parsing (§10): one `repl` subcommand matching §6's option list.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "yalla")]
#[command(version)]
#[command(about = "Yalla - an embeddable terminal REPL framework")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Raise the tracing filter to debug for `yalla_*` targets, overriding
    /// RUST_LOG's absence (GLOBAL).
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive REPL session
    Repl {
        /// Configuration file. Defaults to `repl.config.toml` in the
        /// working directory if present, otherwise built-in defaults.
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,

        /// A file of expressions run before the interactive prompt starts.
        #[arg(short = 'b', long)]
        bootstrap: Option<PathBuf>,

        /// Disable history recording and persistence.
        #[arg(long)]
        no_history: bool,

        /// Disable colored output.
        #[arg(long)]
        no_colors: bool,

        /// Minimal output: suppress the welcome/goodbye banners.
        #[arg(short = 'q', long)]
        quiet: bool,
    },
}
