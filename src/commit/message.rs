//! Commit message generation via the LLM router and git commit creation.

use git2::{ErrorCode, Oid, Repository};
use tracing::debug;

use crate::error::GitError;
use crate::llm::{LlmError, LlmRouter, Provider};
use crate::pipeline::prepare_diff;

/// A commit message produced by one of the backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMessage {
    pub message: String,
    pub provider: Provider,
    /// True when the primary backend failed and the fallback answered.
    pub fell_back: bool,
    /// True when the diff was cut to the word budget before prompting.
    pub truncated: bool,
}

/// Clean `raw_diff` and ask the router for a commit message.
pub async fn generate_commit_message(
    router: &LlmRouter,
    raw_diff: &str,
    max_words: usize,
) -> Result<GeneratedMessage, LlmError> {
    let clean = prepare_diff(raw_diff, max_words);

    debug!(
        "Prompting with {} words of diff (truncated={})",
        clean.words, clean.truncated
    );

    let completion = router.generate(&clean.text).await?;

    Ok(GeneratedMessage {
        message: completion.output,
        provider: completion.provider,
        fell_back: completion.primary_error.is_some(),
        truncated: clean.truncated,
    })
}

/// Commit whatever is currently in the index.
///
/// Creates a root commit when HEAD is unborn. Hooks are not run.
pub fn create_commit(repo: &Repository, message: &str) -> Result<Oid, GitError> {
    let mut index = repo.index().map_err(GitError::CommitFailed)?;
    let tree_id = index.write_tree().map_err(GitError::CommitFailed)?;
    let tree = repo.find_tree(tree_id).map_err(GitError::CommitFailed)?;

    // Get the signature from git config
    let sig = repo.signature().map_err(GitError::ConfigError)?;

    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit().map_err(GitError::CommitFailed)?),
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => None,
        Err(e) => return Err(GitError::CommitFailed(e)),
    };
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    let oid = repo
        .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .map_err(GitError::CommitFailed)?;

    debug!("Created commit {}", oid);
    Ok(oid)
}
