//! OpenAI-compatible chat completions client implementing the completion
//! port. Sends the fixed system/user message pair and returns the first
//! choice's raw text; everything else (status errors, empty choices) maps
//! onto [`CompletionError`] for the generation loop's retry budget.

use async_trait::async_trait;
use quizsmith_application::{CompletionError, CompletionPort, CompletionRequest};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default OpenAI API base.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat-completions adapter for the [`CompletionPort`].
pub struct OpenAiCompletionClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiCompletionClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl CompletionPort for OpenAiCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let body = ChatRequest::from(request);
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CompletionError::Service {
                status: status.as_u16(),
                message: message.chars().take(500).collect(),
            });
        }

        let decoded: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Transport(format!("undecodable response: {e}")))?;

        let choice = decoded
            .choices
            .into_iter()
            .next()
            .ok_or(CompletionError::EmptyResponse)?;

        debug!(
            model = %request.model,
            bytes = choice.message.content.len(),
            "Completion received"
        );
        Ok(choice.message.content)
    }
}

// ==================== Wire types ====================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a CompletionRequest> for ChatRequest<'a> {
    fn from(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_payload,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}
