//! Staged diff collection, message caching and the preview/commit workflow.

pub mod cache;
pub mod diff;
pub mod message;
pub mod workflow;

pub use cache::{CachedMessage, MessageCache, fingerprint};
pub use diff::{CACHE_FILE_NAME, GitRepository, Vcs, collect_staged_diff};
pub use message::{GeneratedMessage, create_commit, generate_commit_message};
pub use workflow::{MessageSource, Mode, Outcome, WorkflowOptions, run};
