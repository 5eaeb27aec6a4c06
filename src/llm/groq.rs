//! Groq backend (OpenAI-compatible chat completions API).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ApiKey, BackendConfig, GROQ_API_KEY_ENV};
use crate::error::ProviderError;

use super::prompt::build_commit_prompt;
use super::provider::{CommitMessageProvider, normalize_message, truncate_body};
use super::router::Provider;

const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 80;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Groq client bound to one model and credential.
pub struct GroqProvider {
    client: reqwest::Client,
    api_key: Option<ApiKey>,
    model: String,
    base_url: String,
}

impl GroqProvider {
    pub fn new(config: &BackendConfig, request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/openai/v1/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CommitMessageProvider for GroqProvider {
    fn provider(&self) -> Provider {
        Provider::Groq
    }

    async fn generate(&self, diff: &str) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(ProviderError::MissingCredentials {
                provider: Provider::Groq,
                env_var: GROQ_API_KEY_ENV,
            })?;

        let prompt = build_commit_prompt(diff);
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        debug!(model = %self.model, prompt_chars = prompt.len(), "Calling Groq");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(|source| ProviderError::Request {
                provider: Provider::Groq,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                provider: Provider::Groq,
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse {
                provider: Provider::Groq,
                reason: e.to_string(),
            })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::InvalidResponse {
                provider: Provider::Groq,
                reason: "response contained no choices".to_string(),
            })?;

        normalize_message(Provider::Groq, &content)
    }
}
