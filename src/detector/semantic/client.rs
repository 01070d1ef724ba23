//! Language-model backends for semantic review
//!
//! The production backend speaks the OpenAI chat-completions protocol over
//! `ureq`. Everything it needs, the API key included, is handed over at
//! construction time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::SemanticReviewConfig;
use crate::detector::AdapterError;

/// How much of an HTTP error body is kept in the error message
const ERROR_BODY_CHARS: usize = 300;

/// A text-completion backend
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send a prompt and return the model's free-text answer
    async fn complete(&self, prompt: &str) -> Result<String, AdapterError>;

    /// Model identifier, for logs
    fn name(&self) -> &str;
}

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
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat-completions client
#[derive(Clone)]
pub struct ChatCompletionsClient {
    endpoint: String,
    model: String,
    api_key: String,
    max_tokens: u32,
    temperature: f32,
    agent: ureq::Agent,
}

impl ChatCompletionsClient {
    pub fn new(config: &SemanticReviewConfig, api_key: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            // Same budget as the isolator, so an abandoned request does not outlive it
            .timeout(config.timeout())
            .build();

        Self {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: api_key.into(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            agent,
        }
    }

    /// Build a client when the configuration carries an API key
    pub fn from_config(config: &SemanticReviewConfig) -> Option<Self> {
        config.api_key().map(|key| Self::new(config, key))
    }

    fn send(&self, prompt: &str) -> Result<String, AdapterError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .agent
            .post(&self.endpoint)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(&request)
            .map_err(|e| match e {
                ureq::Error::Status(code, response) => {
                    let body = response.into_string().unwrap_or_default();
                    let body: String = body.trim().chars().take(ERROR_BODY_CHARS).collect();
                    AdapterError::process(format!(
                        "language model endpoint returned HTTP {}: {}",
                        code, body
                    ))
                }
                ureq::Error::Transport(t) => AdapterError::process(format!(
                    "language model endpoint unreachable: {}",
                    t
                )),
            })?;

        let parsed: ChatResponse = response.into_json().map_err(|e| {
            AdapterError::parse(format!("invalid chat-completions response: {}", e))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AdapterError::parse("chat-completions response had no content"))
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionsClient {
    async fn complete(&self, prompt: &str) -> Result<String, AdapterError> {
        let client = self.clone();
        let prompt = prompt.to_string();

        tokio::task::spawn_blocking(move || client.send(&prompt))
            .await
            .map_err(|e| AdapterError::process(format!("language model request aborted: {}", e)))?
    }

    fn name(&self) -> &str {
        &self.model
    }
}
