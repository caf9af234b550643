//! Entry point: a thin `clap`-derived binary wrapping `yalla_repl::ReplSession`
//! (§10), grounded on `llmspell-cli::main`'s tracing setup (RUST_LOG takes
//! priority over the CLI flag) and the thiserror-library/anyhow-binary split
//! named in §7.1.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use yalla_core::{ConsoleOutput, Output};
use yalla_repl::ReplSession;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    match cli.command {
        Commands::Repl { config, bootstrap, no_history, no_colors, quiet } => {
            run_repl(config, bootstrap, no_history, no_colors, quiet)
        }
    }
}

/// RUST_LOG > --verbose > default (warn for dependencies, info for
/// `yalla_*` targets), per §6's environment-variable table.
fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_target(false).init();
        return;
    }
    let default_filter = if verbose {
        "warn,yalla_core=debug,yalla_config=debug,yalla_context=debug,yalla_history=debug,yalla_render=debug,yalla_repl=debug,yalla_lock=debug,yalla_signal=debug,yalla_async=debug,yalla_middleware=debug"
    } else {
        "warn,yalla_core=info,yalla_config=info,yalla_context=info,yalla_history=info,yalla_render=info,yalla_repl=info,yalla_lock=info,yalla_signal=info,yalla_async=info,yalla_middleware=info"
    };
    tracing_subscriber::fmt().with_env_filter(EnvFilter::new(default_filter)).with_target(false).init();
}

fn default_config_path() -> Option<PathBuf> {
    let candidate = Path::new("repl.config.toml");
    candidate.exists().then(|| candidate.to_path_buf())
}

fn run_repl(
    config_path: Option<PathBuf>,
    bootstrap: Option<PathBuf>,
    no_history: bool,
    no_colors: bool,
    quiet: bool,
) -> Result<()> {
    let config_path = config_path.or_else(default_config_path);
    let config = yalla_config::ReplConfig::load(config_path.as_deref())
        .with_context(|| format!("loading configuration from {config_path:?}"))?;

    let mut session =
        ReplSession::new(config.clone(), no_history, no_colors, quiet).context("initializing REPL session")?;
    let mut output = ConsoleOutput::new();

    run_bootstrap_files(&mut session, &config, bootstrap, &mut output)?;

    session.run(&mut output).context("running REPL session")?;
    Ok(())
}

/// Runs the `--bootstrap` file (if given), then `bootstrap.file` and
/// `bootstrap.files` from config, in that order (§4.1, §6).
fn run_bootstrap_files(
    session: &mut ReplSession,
    config: &yalla_config::ReplConfig,
    cli_bootstrap: Option<PathBuf>,
    output: &mut dyn Output,
) -> Result<()> {
    if let Some(path) = cli_bootstrap {
        session
            .run_bootstrap(&path, output)
            .with_context(|| format!("running bootstrap file {}", path.display()))?;
    }
    if let Some(path) = config.get_opt("bootstrap.file").and_then(|v| v.as_str()) {
        session
            .run_bootstrap(Path::new(path), output)
            .with_context(|| format!("running bootstrap file {path}"))?;
    }
    if let Some(files) = config.get_opt("bootstrap.files").and_then(|v| v.as_array()) {
        for file in files {
            if let Some(path) = file.as_str() {
                session
                    .run_bootstrap(Path::new(path), output)
                    .with_context(|| format!("running bootstrap file {path}"))?;
            }
        }
    }
    Ok(())
}
