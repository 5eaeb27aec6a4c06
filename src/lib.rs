//! diffscribe - Generate semantic Git commit messages from staged changes.
//!
//! # Overview
//!
//! diffscribe reads the staged diff, strips binary and control noise, cuts
//! it to a word budget, masks likely secrets, and asks Gemini or Groq for a
//! conventional-commit message. A preview run caches the suggestion so a
//! later `--commit` run can commit exactly what was shown.

pub mod commit;
pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;

// Re-export commonly used types
pub use commit::{CachedMessage, GitRepository, MessageCache, Mode, Outcome, Vcs, WorkflowOptions};
pub use config::Config;
pub use error::{CacheError, GitError, ProviderError, WorkflowError};
pub use llm::{LlmError, LlmRouter, Provider, RoutingPolicy};
pub use pipeline::{CleanDiff, prepare_diff};
