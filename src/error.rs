//! Error types for diffscribe modules using thiserror.

use thiserror::Error;

use crate::llm::{LlmError, Provider};

/// Errors from the version-control collaborator.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("No staged changes found. Please run `git add <file>` first.")]
    NoStagedChanges,

    #[error("Git repository is unavailable: {0}")]
    VcsUnavailable(#[source] git2::Error),

    #[error("Failed to collect staged diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Failed to create commit: {0}")]
    CommitFailed(#[source] git2::Error),

    #[error("Git config error (missing user.name or user.email): {0}")]
    ConfigError(#[source] git2::Error),
}

/// Errors from a single generation backend.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{provider} API key is not set. Export {env_var} first.")]
    MissingCredentials {
        provider: Provider,
        env_var: &'static str,
    },

    #[error("{provider} is taking too long (> {secs}s)")]
    Timeout { provider: Provider, secs: u64 },

    #[error("{provider} API error: {status} - {body}")]
    Http {
        provider: Provider,
        status: u16,
        body: String,
    },

    #[error("{provider} request failed: {source}")]
    Request {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned an unusable response: {reason}")]
    InvalidResponse { provider: Provider, reason: String },

    #[error("{provider} worker stopped unexpectedly: {reason}")]
    WorkerFailed { provider: Provider, reason: String },
}

impl ProviderError {
    pub fn provider(&self) -> Provider {
        match self {
            ProviderError::MissingCredentials { provider, .. }
            | ProviderError::Timeout { provider, .. }
            | ProviderError::Http { provider, .. }
            | ProviderError::Request { provider, .. }
            | ProviderError::InvalidResponse { provider, .. }
            | ProviderError::WorkerFailed { provider, .. } => *provider,
        }
    }

    /// Short, single-line description used in fallback warnings.
    pub fn summary(&self) -> String {
        match self {
            ProviderError::MissingCredentials { provider, .. } => {
                format!("{provider} API key missing")
            }
            ProviderError::Timeout { provider, secs } => {
                format!("{provider} timed out after {secs}s")
            }
            ProviderError::Http {
                provider, status, ..
            } => format!("{provider} API returned HTTP {status}"),
            ProviderError::Request { provider, .. } => format!("{provider} request failed"),
            ProviderError::InvalidResponse { provider, .. } => {
                format!("{provider} returned an unusable response")
            }
            ProviderError::WorkerFailed { provider, .. } => {
                format!("{provider} worker stopped unexpectedly")
            }
        }
    }
}

/// Errors from the preview/commit message cache.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to read message cache: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("Failed to write message cache: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("Message cache is corrupt: {0}")]
    Corrupt(String),
}

/// Errors surfaced by the preview/commit workflow.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}
