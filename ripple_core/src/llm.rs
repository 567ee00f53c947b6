//! Client for a local OpenAI-compatible chat-completion endpoint.
//!
//! One synchronous request per call, no streaming and no retry. Failures are
//! logged and handed back to the caller.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::error::{Result, RippleError};

/// Connection and sampling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub enabled: bool,
    /// Base URL, e.g. `http://localhost:1234`.
    pub host: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_ms: u64,
    pub system_prompt: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "http://localhost:1234".to_string(),
            model: "local-model".to_string(),
            temperature: 0.8,
            max_tokens: 160,
            timeout_ms: 30_000,
            system_prompt: "You narrate tiny, quiet worlds in spare poetic prose. \
                            Never explain; only describe."
                .to_string(),
        }
    }
}

/// A chat message in the OpenAI schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for `/v1/chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Sends a JSON body to a URL and returns the response body.
pub trait ChatTransport: Send {
    fn post(&self, url: &str, body: &str) -> Result<String>;
}

/// HTTP transport backed by `ureq`.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl ChatTransport for UreqTransport {
    fn post(&self, url: &str, body: &str) -> Result<String> {
        let response = self
            .agent
            .post(url)
            .set("Content-Type", "application/json")
            .send_string(body)
            .map_err(|err| RippleError::Llm(err.to_string()))?;
        Ok(response.into_string()?)
    }
}

/// Chat-completion client.
pub struct LlmClient {
    config: LlmConfig,
    transport: Box<dyn ChatTransport>,
}

impl LlmClient {
    /// Create a client that talks HTTP to `config.host`.
    pub fn new(config: LlmConfig) -> Self {
        let transport = UreqTransport::new(Duration::from_millis(config.timeout_ms));
        Self::with_transport(config, Box::new(transport))
    }

    pub fn with_transport(config: LlmConfig, transport: Box<dyn ChatTransport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.config.host.trim_end_matches('/'))
    }

    pub fn build_request(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(self.config.system_prompt.clone()),
                ChatMessage::user(prompt),
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            stream: false,
        }
    }

    /// Send `prompt` and return the first choice's content.
    pub fn complete(&self, prompt: &str) -> Result<String> {
        let endpoint = self.endpoint();
        let body = serde_json::to_string(&self.build_request(prompt))?;
        debug!(%endpoint, bytes = body.len(), "posting chat completion");

        let result = self
            .transport
            .post(&endpoint, &body)
            .and_then(|raw| parse_completion(&raw));
        if let Err(err) = &result {
            error!(%endpoint, error = %err, "chat completion failed");
        }
        result
    }
}

fn parse_completion(raw: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(raw)?;
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| RippleError::Llm("response contained no choices".to_string()))
}
