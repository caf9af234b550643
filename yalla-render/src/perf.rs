//! Color-graded performance line (§4.5 step 7): green at or under 100ms,
//! yellow at or under 500ms, red above.

use crate::color;

pub fn perf_line(elapsed_ms: u128, memory_delta_bytes: i64, colors_enabled: bool) -> String {
    let timing = format!("{elapsed_ms}ms");
    let graded = if elapsed_ms <= 100 {
        color::green(colors_enabled, &timing)
    } else if elapsed_ms <= 500 {
        color::yellow(colors_enabled, &timing)
    } else {
        color::red(colors_enabled, &timing)
    };
    let sign = if memory_delta_bytes >= 0 { "+" } else { "-" };
    format!("  [{graded}, mem {sign}{}b]", memory_delta_bytes.unsigned_abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grades_fast_calls_green() {
        assert!(perf_line(10, 0, true).contains("\x1b[32m"));
    }

    #[test]
    fn grades_moderate_calls_yellow() {
        assert!(perf_line(300, 0, true).contains("\x1b[33m"));
    }

    #[test]
    fn grades_slow_calls_red() {
        assert!(perf_line(900, 0, true).contains("\x1b[31m"));
    }

    #[test]
    fn boundary_values_are_inclusive_of_the_lower_tier() {
        assert!(perf_line(100, 0, true).contains("\x1b[32m"));
        assert!(perf_line(500, 0, true).contains("\x1b[33m"));
    }
}
