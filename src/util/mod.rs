//! Utility helpers for hostmetrics.

/// Trims surrounding whitespace, including the byte order mark `U+FEFF`.
pub fn trim_text(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// Longest rendering of untrusted input kept in a diagnostic message.
const MAX_LOG_LINE_CHARS: usize = 256;

/// Renders a line of untrusted text for inclusion in an error message.
///
/// Control characters (tabs, newlines, escape sequences, ...) are escaped so
/// the result is always a single printable line. Output longer than
/// `MAX_LOG_LINE_CHARS` characters is cut and marked with `...`.
pub fn log_safe_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len().min(MAX_LOG_LINE_CHARS));

    for (count, ch) in line.chars().enumerate() {
        if count == MAX_LOG_LINE_CHARS {
            out.push_str("...");
            break;
        }
        if ch.is_control() {
            out.extend(ch.escape_default());
        } else {
            out.push(ch);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_text() {
        assert_eq!(trim_text("  a\tb \r\n"), "a\tb");
        assert_eq!(trim_text("\u{feff}cpu\tgauge\t1"), "cpu\tgauge\t1");
        assert_eq!(trim_text("\u{feff} \u{feff}"), "");
    }

    #[test]
    fn test_log_safe_line_plain() {
        assert_eq!(log_safe_line("cpu_info_model"), "cpu_info_model");
    }

    #[test]
    fn test_log_safe_line_escapes_control_chars() {
        assert_eq!(log_safe_line("a\tb\x1b[31m"), "a\\tb\\u{1b}[31m");
        assert_eq!(log_safe_line("line\r\n"), "line\\r\\n");
    }

    #[test]
    fn test_log_safe_line_keeps_unicode() {
        assert_eq!(log_safe_line("température"), "température");
    }

    #[test]
    fn test_log_safe_line_truncates() {
        let long = "x".repeat(1000);
        let safe = log_safe_line(&long);
        assert_eq!(safe.len(), MAX_LOG_LINE_CHARS + 3);
        assert!(safe.ends_with("..."));
    }
}
