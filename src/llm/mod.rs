//! Commit message backends, routing and prompt construction.

pub mod gemini;
pub mod groq;
pub mod prompt;
pub mod provider;
pub mod router;

pub use gemini::GeminiProvider;
pub use groq::GroqProvider;
pub use prompt::build_commit_prompt;
pub use provider::{CommitMessageProvider, normalize_message};
pub use router::{LlmCompletion, LlmError, LlmRouter, Provider, ProviderSelection, RoutingPolicy};
