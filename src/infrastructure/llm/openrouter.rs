use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument};

use crate::domain::{ports::CompletionService, DomainError, Message};
use crate::infrastructure::config::LlmConfig;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Chat completions through OpenRouter's OpenAI-compatible endpoint.
pub struct OpenRouterClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    referer: String,
    title: String,
    not_configured_message: String,
}

impl OpenRouterClient {
    pub fn new(config: &LlmConfig, not_configured_message: impl Into<String>) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| DomainError::upstream(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            referer: config.referer.clone(),
            title: config.title.clone(),
            not_configured_message: not_configured_message.into(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn request_body<'a>(&'a self, messages: &'a [Message]) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

fn parse_response(body: &str) -> Result<String, DomainError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| DomainError::upstream(format!("invalid completion response: {e}")))?;

    if let Some(err) = response.error {
        return Err(DomainError::upstream(err.message));
    }

    response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| DomainError::upstream("no completion choices returned"))
}

#[async_trait]
impl CompletionService for OpenRouterClient {
    #[instrument(skip(self, messages), fields(model = %self.model, count = messages.len()))]
    async fn complete(&self, messages: &[Message]) -> Result<String, DomainError> {
        let Some(api_key) = &self.api_key else {
            error!("OPEN_ROUTER_API_KEY is not set");
            return Ok(self.not_configured_message.clone());
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(&self.request_body(messages))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DomainError::timeout("completion request")
                } else {
                    DomainError::upstream(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DomainError::upstream(e.to_string()))?;

        if !status.is_success() {
            return Err(DomainError::upstream(format!(
                "completion API returned {status}: {body}"
            )));
        }

        let answer = parse_response(&body)?;
        debug!(answer_len = answer.len(), "completion received");
        Ok(answer)
    }
}
