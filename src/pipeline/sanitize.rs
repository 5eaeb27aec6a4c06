//! Strip terminal escapes, control characters, emoji and binary blobs from diff text.

use std::sync::LazyLock;

use regex_lite::Regex;
use unicode_general_category::{GeneralCategory, get_general_category};

/// Lines longer than this made only of base64/hex characters are treated as
/// embedded binary content (image diffs, lockfile blobs) and dropped.
pub const BINARY_LINE_MIN_LENGTH: usize = 300;

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("Invalid regex"));

/// Sanitize raw diff text for the prompt.
///
/// Binary-looking lines are removed entirely rather than blanked, so the
/// output can have fewer lines than the input but never more. Every other
/// line keeps its position and all characters except ANSI colour escapes,
/// `So` symbols (emoji) and `C*` characters (control, format, surrogate,
/// private use, unassigned).
pub fn sanitize(diff: &str) -> String {
    diff.lines()
        .filter(|line| !is_binary_line(line))
        .map(sanitize_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether a line looks like an inlined base64 or hex blob.
pub fn is_binary_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.chars().count() > BINARY_LINE_MIN_LENGTH
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
}

fn sanitize_line(line: &str) -> String {
    ANSI_ESCAPE
        .replace_all(line, "")
        .chars()
        .filter(|&c| !is_disallowed(c))
        .collect()
}

fn is_disallowed(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::OtherSymbol
            | GeneralCategory::Control
            | GeneralCategory::Format
            | GeneralCategory::Surrogate
            | GeneralCategory::PrivateUse
            | GeneralCategory::Unassigned
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_plain_diff() {
        let diff = "diff --git a/f.rs b/f.rs\n+let x = 1;\n-let x = 2;\n context";
        assert_eq!(sanitize(diff), diff);
    }

    #[test]
    fn test_sanitize_removes_emoji() {
        let diff = "+println!(\"done \u{2705}\");\n+// rocket \u{1F680} launch";
        let sanitized = sanitize(diff);
        assert_eq!(sanitized, "+println!(\"done \");\n+// rocket  launch");
    }

    #[test]
    fn test_sanitize_removes_control_and_format_chars() {
        let diff = "+a\u{0007}b\u{200B}c\u{FEFF}d\u{E000}e";
        assert_eq!(sanitize(diff), "+abcde");
    }

    #[test]
    fn test_sanitize_removes_tabs_as_control_chars() {
        assert_eq!(sanitize("+\tindented"), "+indented");
    }

    #[test]
    fn test_sanitize_strips_ansi_escapes() {
        let diff = "\x1b[31m-old line\x1b[0m\n\x1b[32m+new line\x1b[0m";
        let sanitized = sanitize(diff);
        assert_eq!(sanitized, "-old line\n+new line");
        assert!(!sanitized.contains("[31m"));
    }

    #[test]
    fn test_sanitize_drops_long_base64_line() {
        let blob = format!("+{}==", "iVBORw0KGgoAAAANSUhEUg".repeat(20));
        let diff = format!("+real change\n{}\n+another", blob);
        let sanitized = sanitize(&diff);
        assert_eq!(sanitized, "+real change\n+another");
    }

    #[test]
    fn test_sanitize_keeps_long_line_with_spaces() {
        let line = format!("+{}", "word ".repeat(100));
        assert!(!is_binary_line(&line));
        assert_eq!(sanitize(&line).lines().count(), 1);
    }

    #[test]
    fn test_sanitize_keeps_short_base64_line() {
        let line = "+aGVsbG8gd29ybGQ=";
        assert!(!is_binary_line(line));
        assert_eq!(sanitize(line), line);
    }

    #[test]
    fn test_binary_line_threshold_is_exclusive() {
        let at_limit = "a".repeat(BINARY_LINE_MIN_LENGTH);
        let over_limit = "a".repeat(BINARY_LINE_MIN_LENGTH + 1);
        assert!(!is_binary_line(&at_limit));
        assert!(is_binary_line(&over_limit));
    }

    #[test]
    fn test_sanitize_never_adds_lines() {
        let inputs = [
            "",
            "\n\n\n",
            "a\r\nb\r\nc",
            "+x\u{1F600}\n\u{0000}\n",
            "single",
        ];
        for input in inputs {
            assert!(
                sanitize(input).lines().count() <= input.lines().count(),
                "line count grew for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_sanitize_splits_only_on_newlines() {
        // Unicode line and paragraph separators stay inside the line.
        let diff = "+a\u{2028}b\u{0b}c\u{85}d\u{2029}e\n+f";
        let sanitized = sanitize(diff);
        assert_eq!(sanitized, "+a\u{2028}bcd\u{2029}e\n+f");
        assert_eq!(sanitized.lines().count(), 2);
    }

    #[test]
    fn test_sanitize_strips_carriage_returns() {
        assert_eq!(sanitize("+a\r\n+b\r\n"), "+a\n+b");
    }
}
