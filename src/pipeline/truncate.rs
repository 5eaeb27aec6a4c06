//! Word-budget truncation that never splits a line.

/// Default word budget for the diff sent to a provider.
pub const DEFAULT_MAX_WORDS: usize = 2000;

/// Result of truncating a diff to a word budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncatedDiff {
    /// Included lines, followed by the truncation marker when `truncated`.
    pub text: String,
    /// Words in the included lines (the marker is not counted).
    pub words: usize,
    pub truncated: bool,
}

/// The comment line appended when lines were cut.
pub fn truncation_marker(max_words: usize) -> String {
    format!("# Diff truncated to first {max_words} words.")
}

/// Keep whole lines, in order, until the next one would exceed `max_words`.
///
/// The line that would overflow the budget and everything after it are
/// excluded, even if later lines are short enough to fit.
pub fn truncate(text: &str, max_words: usize) -> TruncatedDiff {
    let mut included = Vec::new();
    let mut words = 0usize;
    let mut truncated = false;

    for line in text.trim().lines() {
        let line_words = line.split_whitespace().count();
        if words + line_words > max_words {
            truncated = true;
            break;
        }
        included.push(line);
        words += line_words;
    }

    let mut text = included.join("\n");
    if truncated {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&truncation_marker(max_words));
    }

    TruncatedDiff {
        text,
        words,
        truncated,
    }
}
