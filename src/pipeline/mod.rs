//! Diff cleaning pipeline: sanitize, truncate, then redact.

pub mod redact;
pub mod sanitize;
pub mod truncate;

use tracing::debug;

pub use redact::{MASK, Redaction, RedactionRule, Scrubber, scrub, scrub_line};
pub use sanitize::{BINARY_LINE_MIN_LENGTH, is_binary_line, sanitize};
pub use truncate::{DEFAULT_MAX_WORDS, TruncatedDiff, truncate, truncation_marker};

/// A diff that is safe to embed in a provider prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanDiff {
    pub text: String,
    pub words: usize,
    pub truncated: bool,
}

/// Run the full cleaning pipeline over a raw staged diff.
///
/// Never fails: every stage is total over arbitrary text.
pub fn prepare_diff(raw: &str, max_words: usize) -> CleanDiff {
    prepare_diff_with(raw, max_words, &Scrubber::default())
}

/// Same as [`prepare_diff`] with a caller-supplied scrubber.
pub fn prepare_diff_with(raw: &str, max_words: usize, scrubber: &Scrubber) -> CleanDiff {
    let sanitized = sanitize(raw);
    let truncated = truncate(&sanitized, max_words);
    let text = scrubber.scrub(&truncated.text);

    debug!(
        raw_lines = raw.lines().count(),
        sanitized_lines = sanitized.lines().count(),
        words = truncated.words,
        truncated = truncated.truncated,
        "Prepared diff"
    );

    CleanDiff {
        text,
        words: truncated.words,
        truncated: truncated.truncated,
    }
}
