//! OpenAI chat-completions client.
//!
//! The endpoint URL and the bearer `Authorization` header come from
//! `async-openai`'s [`OpenAIConfig`]; the call itself is a single `reqwest`
//! POST so that non-200 statuses surface as-is instead of being retried.

use std::sync::Arc;

use async_openai::{
    config::{Config as _, OpenAIConfig},
    types::Role,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{
    base::{config::Config, types::Res},
    service::dedup::DuplicateFilter,
};

use super::{GenericLlmClient, LlmClient};

// Extra methods on `LlmClient` applied by the openai implementation.

impl LlmClient {
    pub fn openai(config: &Config, dedup: DuplicateFilter) -> Self {
        let client = OpenAiLlmClient::new(config, dedup);
        Self { inner: Arc::new(client) }
    }
}

// Errors.

/// Failures talking to the completion API.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// The API answered with a status other than 200.
    #[error("completion API returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },
    /// The request never produced a response.
    #[error("completion API request failed: {0}")]
    Transport(#[source] reqwest::Error),
    /// The response body was not the expected JSON shape.
    #[error("completion API response could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),
}

// Wire types.

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatCompletionMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatCompletionMessage {
    role: Role,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionReply,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionReply {
    content: String,
}

// Specific implementations.

/// OpenAI LLM client implementation.
#[derive(Clone)]
pub struct OpenAiLlmClient {
    http: reqwest::Client,
    openai: OpenAIConfig,
    model: String,
    max_tokens: u32,
    fallback_reply: String,
    dedup: DuplicateFilter,
}

impl OpenAiLlmClient {
    /// Create a new OpenAI LLM client.
    #[instrument(name = "OpenAiLlmClient::new", skip_all)]
    pub fn new(config: &Config, dedup: DuplicateFilter) -> Self {
        let openai = OpenAIConfig::new()
            .with_api_key(config.openai_api_key.clone())
            .with_api_base(config.openai_api_base.trim_end_matches('/'));

        Self {
            http: reqwest::Client::new(),
            openai,
            model: config.openai_model.clone(),
            max_tokens: config.openai_max_tokens,
            fallback_reply: config.fallback_reply.clone(),
            dedup,
        }
    }

    /// Build the single-message request for a prompt.
    fn build_request(&self, prompt: &str) -> ChatCompletionRequest<'_> {
        ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatCompletionMessage {
                role: Role::User,
                content: escape_html(prompt),
            }],
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl GenericLlmClient for OpenAiLlmClient {
    #[instrument(name = "OpenAiLlmClient::complete", skip_all)]
    async fn complete(&self, prompt: &str) -> Res<String> {
        // Same prompt as last time: stay quiet.
        if self.dedup.should_suppress(prompt) {
            info!("Prompt repeats the previous one; not calling the completion API.");
            return Ok(String::new());
        }

        let request = self.build_request(prompt);
        debug!("Sending request data: {request:?}");

        let response = self
            .http
            .post(self.openai.url("/chat/completions"))
            .headers(self.openai.headers())
            .json(&request)
            .send()
            .await
            .map_err(CompletionError::Transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!("Completion API returned HTTP {status}");
            return Err(CompletionError::Upstream { status: status.as_u16(), body }.into());
        }

        let bytes = response.bytes().await.map_err(CompletionError::Transport)?;
        let parsed: ChatCompletionResponse = serde_json::from_slice(&bytes).map_err(CompletionError::Decode)?;

        let Some(choice) = parsed.choices.into_iter().next() else {
            warn!("Completion API returned no choices; using the fallback reply.");
            return Ok(self.fallback_reply.clone());
        };

        Ok(choice.message.content.trim().to_string())
    }
}

/// Escape the HTML-significant characters of `s`.
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '\'' => result.push_str("&#39;"),
            '"' => result.push_str("&#34;"),
            _ => result.push(c),
        }
    }
    result
}

// Tests.
