//! The generation capability every backend implements.

use async_trait::async_trait;

use crate::error::ProviderError;

use super::router::Provider;

/// Maximum number of characters of an error body kept in `ProviderError::Http`.
pub(crate) const MAX_ERROR_BODY_CHARS: usize = 500;

/// A backend that turns a cleaned diff into a commit message.
///
/// This abstraction allows routing between backends and faking them in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommitMessageProvider: Send + Sync {
    /// Which backend this is.
    fn provider(&self) -> Provider;

    /// Generate a commit message for an already sanitized, truncated and scrubbed diff.
    async fn generate(&self, diff: &str) -> Result<String, ProviderError>;
}

/// Clean up raw model output into a bare commit message.
///
/// Models sometimes wrap the message in a code fence despite the prompt;
/// the fence lines are removed and surrounding whitespace trimmed. An empty
/// result is an error so the router can fall back.
pub fn normalize_message(provider: Provider, raw: &str) -> Result<String, ProviderError> {
    let trimmed = raw.trim();

    let unfenced = match trimmed.strip_prefix("```") {
        Some(rest) => {
            // Drop an optional language tag on the opening fence line.
            let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
            body.trim_end().strip_suffix("```").unwrap_or(body)
        }
        None => trimmed,
    };

    let message = unfenced.trim();
    if message.is_empty() {
        return Err(ProviderError::InvalidResponse {
            provider,
            reason: "empty commit message".to_string(),
        });
    }

    Ok(message.to_string())
}

/// Keep error bodies short enough to print.
pub(crate) fn truncate_body(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}
