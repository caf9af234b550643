//! The four `display.mode` values (§4.1, §4.6).

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Compact,
    Verbose,
    Json,
    Dump,
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DisplayMode::Compact => "compact",
            DisplayMode::Verbose => "verbose",
            DisplayMode::Json => "json",
            DisplayMode::Dump => "dump",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown display mode '{0}', expected one of: compact, verbose, json, dump")]
pub struct UnknownDisplayMode(pub String);

impl FromStr for DisplayMode {
    type Err = UnknownDisplayMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compact" => Ok(DisplayMode::Compact),
            "verbose" => Ok(DisplayMode::Verbose),
            "json" => Ok(DisplayMode::Json),
            "dump" => Ok(DisplayMode::Dump),
            other => Err(UnknownDisplayMode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_known_mode() {
        assert_eq!("compact".parse(), Ok(DisplayMode::Compact));
        assert_eq!("verbose".parse(), Ok(DisplayMode::Verbose));
        assert_eq!("json".parse(), Ok(DisplayMode::Json));
        assert_eq!("dump".parse(), Ok(DisplayMode::Dump));
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!("nonsense".parse::<DisplayMode>().is_err());
    }
}
