//! ANSI color gating (§4.6): `display.colors`, `NO_COLOR`, and a Windows
//! ANSI probe, mirrored from the grounding repository's
//! `OutputFormatter::should_use_color` and extended with the `ANSICON`/
//! `ConEmuANSI` checks the distilled spec calls for on platforms without
//! native ANSI support.

use std::env;

/// Resolves whether ANSI escapes should be emitted, given the configured
/// `display.colors` flag. `NO_COLOR` (set to any non-empty value) always
/// wins; otherwise Windows consoles need `ANSICON` or `ConEmuANSI` present
/// to be considered ANSI-capable.
pub fn color_enabled(configured: bool) -> bool {
    if !configured {
        return false;
    }
    if env::var("NO_COLOR").map(|v| !v.is_empty()).unwrap_or(false) {
        return false;
    }
    if cfg!(windows) {
        return env::var("ANSICON").is_ok() || env::var("ConEmuANSI").is_ok();
    }
    true
}

const RESET: &str = "\x1b[0m";

fn wrap(enabled: bool, code: &str, text: &str) -> String {
    if enabled {
        format!("\x1b[{code}m{text}{RESET}")
    } else {
        text.to_string()
    }
}

pub fn dim(enabled: bool, text: &str) -> String {
    wrap(enabled, "2", text)
}

pub fn green(enabled: bool, text: &str) -> String {
    wrap(enabled, "32", text)
}

pub fn red(enabled: bool, text: &str) -> String {
    wrap(enabled, "31", text)
}

pub fn yellow(enabled: bool, text: &str) -> String {
    wrap(enabled, "33", text)
}

pub fn bold(enabled: bool, text: &str) -> String {
    wrap(enabled, "1", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_color_passes_text_through_unchanged() {
        assert_eq!(green(false, "ok"), "ok");
    }

    #[test]
    fn enabled_color_wraps_with_escape_and_reset() {
        assert_eq!(green(true, "ok"), "\x1b[32mok\x1b[0m");
    }

    #[test]
    fn configured_false_disables_regardless_of_environment() {
        assert!(!color_enabled(false));
    }
}
