//! The two-phase preview/commit driver.

use tracing::{info, warn};

use crate::error::{CacheError, WorkflowError};
use crate::llm::{LlmRouter, Provider};
use crate::pipeline::DEFAULT_MAX_WORDS;

use super::cache::{CachedMessage, MessageCache};
use super::diff::Vcs;
use super::message::generate_commit_message;

/// What the invocation should do with the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Generate, cache and display.
    Preview,
    /// Commit with the cached message, or a fresh one if none is cached.
    Commit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowOptions {
    pub max_words: usize,
    /// Discard a cached message generated from a different diff.
    pub strict_cache: bool,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            max_words: DEFAULT_MAX_WORDS,
            strict_cache: false,
        }
    }
}

/// Where the final message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSource {
    Generated { provider: Provider, fell_back: bool },
    Cached,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub message: String,
    pub source: MessageSource,
    /// Set in commit mode.
    pub commit_id: Option<String>,
    /// The diff was cut to the word budget before prompting.
    pub truncated: bool,
}

/// Run one invocation against `vcs`.
///
/// Preview generates a message and caches it; a cache write failure is only
/// logged. Commit consumes the cached message when present, otherwise
/// generates one, and never leaves a consumed entry behind.
pub async fn run(
    vcs: &dyn Vcs,
    router: &LlmRouter,
    cache: &MessageCache,
    mode: Mode,
    options: WorkflowOptions,
) -> Result<Outcome, WorkflowError> {
    let raw_diff = vcs.staged_diff()?;

    match mode {
        Mode::Preview => preview(&raw_diff, router, cache, options).await,
        Mode::Commit => commit(vcs, &raw_diff, router, cache, options).await,
    }
}

async fn preview(
    raw_diff: &str,
    router: &LlmRouter,
    cache: &MessageCache,
    options: WorkflowOptions,
) -> Result<Outcome, WorkflowError> {
    let generated = generate_commit_message(router, raw_diff, options.max_words).await?;

    let entry = CachedMessage::for_diff(generated.message.clone(), raw_diff);
    if let Err(e) = cache.save(&entry) {
        warn!("Could not cache commit message: {}", e);
    }

    Ok(Outcome {
        message: generated.message,
        source: MessageSource::Generated {
            provider: generated.provider,
            fell_back: generated.fell_back,
        },
        commit_id: None,
        truncated: generated.truncated,
    })
}

async fn commit(
    vcs: &dyn Vcs,
    raw_diff: &str,
    router: &LlmRouter,
    cache: &MessageCache,
    options: WorkflowOptions,
) -> Result<Outcome, WorkflowError> {
    let (cached, had_entry) = match cache.load() {
        Ok(Some(entry)) => (Some(entry), true),
        Ok(None) => (None, false),
        Err(CacheError::Corrupt(reason)) => {
            warn!("Ignoring corrupt message cache: {}", reason);
            (None, true)
        }
        Err(e) => return Err(e.into()),
    };

    let cached = cached.filter(|entry| match entry.matches_diff(raw_diff) {
        Some(false) if options.strict_cache => {
            warn!("Cached message was generated for a different diff; regenerating");
            false
        }
        Some(false) => {
            warn!("Cached message was generated for a different diff; using it anyway");
            true
        }
        _ => true,
    });

    let (message, source, truncated) = match cached {
        Some(entry) => {
            info!("Using cached commit message");
            (entry.message, MessageSource::Cached, false)
        }
        None => {
            let generated = generate_commit_message(router, raw_diff, options.max_words).await?;
            let source = MessageSource::Generated {
                provider: generated.provider,
                fell_back: generated.fell_back,
            };
            (generated.message, source, generated.truncated)
        }
    };

    let commit_id = vcs.commit(&message)?;
    info!("Committed {}", commit_id);

    if had_entry {
        if let Err(e) = cache.clear() {
            warn!("Could not clear message cache: {}", e);
        }
    }

    Ok(Outcome {
        message,
        source,
        commit_id: Some(commit_id),
        truncated,
    })
}
