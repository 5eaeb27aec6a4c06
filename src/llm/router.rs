//! Provider selection and fallback orchestration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ProviderError;

use super::gemini::GeminiProvider;
use super::groq::GroqProvider;
use super::provider::CommitMessageProvider;

/// Supported generation backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    Groq,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "Gemini",
            Provider::Groq => "Groq",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary + fallback selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderSelection {
    pub primary: Provider,
    pub fallback: Provider,
}

impl ProviderSelection {
    pub fn from_primary(primary: Provider) -> Self {
        let fallback = match primary {
            Provider::Gemini => Provider::Groq,
            Provider::Groq => Provider::Gemini,
        };
        Self { primary, fallback }
    }
}

impl Default for ProviderSelection {
    fn default() -> Self {
        ProviderSelection::from_primary(Provider::Gemini)
    }
}

/// Which backend goes first, and whether that first attempt is time-bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingPolicy {
    pub selection: ProviderSelection,
    /// Wall-clock budget for the primary attempt. `None` waits indefinitely.
    pub first_attempt_timeout: Option<Duration>,
}

impl RoutingPolicy {
    /// Gemini on a background task, bounded by `timeout`, then Groq.
    pub fn timed(timeout: Duration) -> Self {
        Self {
            selection: ProviderSelection::from_primary(Provider::Gemini),
            first_attempt_timeout: Some(timeout),
        }
    }

    /// Groq, then Gemini, both awaited without a bound.
    pub fn sequential() -> Self {
        Self {
            selection: ProviderSelection::from_primary(Provider::Groq),
            first_attempt_timeout: None,
        }
    }
}

/// LLM orchestration error.
#[derive(Debug)]
pub enum LlmError {
    BothProvidersFailed {
        primary: Provider,
        primary_error: ProviderError,
        fallback: Provider,
        fallback_error: ProviderError,
    },
}

impl LlmError {
    pub fn summary(&self) -> String {
        match self {
            LlmError::BothProvidersFailed {
                primary,
                primary_error,
                fallback,
                fallback_error,
            } => format!(
                "Both {} and {} failed. {} error: {}. {} error: {}.",
                primary,
                fallback,
                primary,
                primary_error.summary(),
                fallback,
                fallback_error.summary()
            ),
        }
    }

    pub fn detailed(&self) -> String {
        match self {
            LlmError::BothProvidersFailed {
                primary,
                primary_error,
                fallback,
                fallback_error,
            } => format!(
                "Both {} and {} failed. {} error: {}. {} error: {}.",
                primary, fallback, primary, primary_error, fallback, fallback_error
            ),
        }
    }

    pub fn primary_error(&self) -> &ProviderError {
        match self {
            LlmError::BothProvidersFailed { primary_error, .. } => primary_error,
        }
    }

    pub fn fallback_error(&self) -> &ProviderError {
        match self {
            LlmError::BothProvidersFailed { fallback_error, .. } => fallback_error,
        }
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.detailed())
    }
}

impl std::error::Error for LlmError {}

/// Successful generation with metadata.
#[derive(Debug)]
pub struct LlmCompletion {
    pub output: String,
    pub provider: Provider,
    /// Why the primary was skipped, when the fallback produced `output`.
    pub primary_error: Option<ProviderError>,
}

/// Routes a generation request between two backends according to a [`RoutingPolicy`].
///
/// With a first-attempt timeout the primary call runs on its own task. When
/// the bound elapses the router stops waiting and moves on to the fallback;
/// the abandoned call is detached, not cancelled, and may keep running until
/// its own HTTP timeout. The fallback always runs on the caller's task after
/// the primary has been given up on, so the router never issues both calls
/// at once.
pub struct LlmRouter {
    policy: RoutingPolicy,
    gemini: Arc<dyn CommitMessageProvider>,
    groq: Arc<dyn CommitMessageProvider>,
}

impl LlmRouter {
    pub fn new(
        policy: RoutingPolicy,
        gemini: Arc<dyn CommitMessageProvider>,
        groq: Arc<dyn CommitMessageProvider>,
    ) -> Self {
        Self {
            policy,
            gemini,
            groq,
        }
    }

    /// Build the HTTP backends and router from explicit configuration.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let gemini = GeminiProvider::new(&config.gemini, config.request_timeout)?;
        let groq = GroqProvider::new(&config.groq, config.request_timeout)?;
        Ok(Self::new(config.policy, Arc::new(gemini), Arc::new(groq)))
    }

    pub fn primary(&self) -> Provider {
        self.policy.selection.primary
    }

    pub fn fallback(&self) -> Provider {
        self.policy.selection.fallback
    }

    fn backend(&self, provider: Provider) -> &Arc<dyn CommitMessageProvider> {
        match provider {
            Provider::Gemini => &self.gemini,
            Provider::Groq => &self.groq,
        }
    }

    /// Generate a commit message for a cleaned diff, falling back once on failure.
    pub async fn generate(&self, diff: &str) -> Result<LlmCompletion, LlmError> {
        let primary = self.primary();
        let fallback = self.fallback();

        let primary_result = match self.policy.first_attempt_timeout {
            Some(limit) => self.run_bounded(primary, diff, limit).await,
            None => self.backend(primary).generate(diff).await,
        };

        let primary_error = match primary_result {
            Ok(output) => {
                debug!("{} produced the commit message", primary);
                return Ok(LlmCompletion {
                    output,
                    provider: primary,
                    primary_error: None,
                });
            }
            Err(e) => e,
        };

        warn!(
            "{}. Falling back to {}...",
            primary_error.summary(),
            fallback
        );

        match self.backend(fallback).generate(diff).await {
            Ok(output) => Ok(LlmCompletion {
                output,
                provider: fallback,
                primary_error: Some(primary_error),
            }),
            Err(fallback_error) => Err(LlmError::BothProvidersFailed {
                primary,
                primary_error,
                fallback,
                fallback_error,
            }),
        }
    }

    /// Run `provider` on a spawned task and wait at most `limit` for it.
    async fn run_bounded(
        &self,
        provider: Provider,
        diff: &str,
        limit: Duration,
    ) -> Result<String, ProviderError> {
        let backend = Arc::clone(self.backend(provider));
        let diff = diff.to_owned();
        let handle = tokio::spawn(async move { backend.generate(&diff).await });

        match tokio::time::timeout(limit, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(ProviderError::WorkerFailed {
                provider,
                reason: join_error.to_string(),
            }),
            Err(_) => {
                debug!(
                    "Abandoning in-flight {} call after {:?}; it is not cancelled",
                    provider, limit
                );
                Err(ProviderError::Timeout {
                    provider,
                    secs: limit.as_secs(),
                })
            }
        }
    }
}
