//! Crate-level error type (§7.1), composed from the lower crates' own
//! error enums rather than flattened.

use crate::eval::EvalError;
use thiserror::Error;
use yalla_config::ConfigError;
use yalla_history::HistoryError;

#[derive(Debug, Error)]
pub enum ReplError {
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("history error: {0}")]
    History(#[from] HistoryError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
