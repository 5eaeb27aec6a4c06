//! Runtime configuration resolved from the environment.
//!
//! Credentials are read once here and handed to the backends explicitly;
//! nothing in the crate mutates the process environment.

use std::env;
use std::fmt;
use std::time::Duration;

use tracing::warn;

use crate::llm::RoutingPolicy;
use crate::pipeline::DEFAULT_MAX_WORDS;

pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";
pub const GEMINI_MODEL_ENV: &str = "DIFFSCRIBE_GEMINI_MODEL";
pub const GROQ_MODEL_ENV: &str = "DIFFSCRIBE_GROQ_MODEL";
pub const PRIMARY_TIMEOUT_ENV: &str = "DIFFSCRIBE_PRIMARY_TIMEOUT";
pub const MAX_WORDS_ENV: &str = "DIFFSCRIBE_MAX_WORDS";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GROQ_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com";

/// Default wall-clock budget for the first provider attempt.
pub const DEFAULT_PRIMARY_TIMEOUT_SECS: u64 = 15;

/// Per-request HTTP timeout, so an abandoned primary call eventually ends.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// An API key whose `Debug` output never shows the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Accept a credential unless it is blank or an unfilled `your_...` placeholder.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() || value.contains("your_") {
            None
        } else {
            Some(Self(value.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Settings for one HTTP backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub api_key: Option<ApiKey>,
    pub model: String,
    pub base_url: String,
}

/// Everything a run needs besides the repository itself.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini: BackendConfig,
    pub groq: BackendConfig,
    pub policy: RoutingPolicy,
    pub max_words: usize,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini: BackendConfig {
                api_key: None,
                model: DEFAULT_GEMINI_MODEL.to_string(),
                base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            },
            groq: BackendConfig {
                api_key: None,
                model: DEFAULT_GROQ_MODEL.to_string(),
                base_url: DEFAULT_GROQ_BASE_URL.to_string(),
            },
            policy: RoutingPolicy::timed(Duration::from_secs(DEFAULT_PRIMARY_TIMEOUT_SECS)),
            max_words: DEFAULT_MAX_WORDS,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Build the configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Config::default();

        config.gemini.api_key = read_var(GEMINI_API_KEY_ENV).and_then(|v| ApiKey::parse(&v));
        config.groq.api_key = read_var(GROQ_API_KEY_ENV).and_then(|v| ApiKey::parse(&v));

        if let Some(model) = read_var(GEMINI_MODEL_ENV) {
            config.gemini.model = model;
        }
        if let Some(model) = read_var(GROQ_MODEL_ENV) {
            config.groq.model = model;
        }

        config.policy.first_attempt_timeout = Some(Duration::from_secs(parse_or_default(
            PRIMARY_TIMEOUT_ENV,
            DEFAULT_PRIMARY_TIMEOUT_SECS,
        )));
        config.max_words = parse_or_default(MAX_WORDS_ENV, DEFAULT_MAX_WORDS as u64) as usize;

        config
    }
}

fn read_var(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

/// Parse a numeric variable, warning and using `default` when it is invalid.
fn parse_or_default(name: &str, default: u64) -> u64 {
    match read_var(name) {
        Some(v) => match v.parse::<u64>() {
            Ok(n) => n,
            Err(_) => {
                warn!("Invalid {} value '{}', using default {}", name, v, default);
                default
            }
        },
        None => default,
    }
}
