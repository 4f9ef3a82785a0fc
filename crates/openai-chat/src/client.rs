use std::time::Duration;

use crate::types::{ChatMessage, ChatRequest, ChatResponse};
use crate::{ChatError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";

/// System prompt sent ahead of every user prompt by [`Client::ask`].
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert Crossplane infrastructure assistant. \
Provide helpful, accurate, and actionable responses about Crossplane resources, Kubernetes, \
and cloud infrastructure. Keep responses concise but informative.";

// ─── ClientConfig ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Bearer credential. Must be non-empty.
    pub api_key: String,
    pub model: String,
    /// Endpoint root; `/chat/completions` is appended.
    pub base_url: String,
    /// Upper bound for the whole request, connect through body read.
    pub timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_tokens: 1000,
            temperature: 0.7,
        }
    }
}

// ─── Client ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
    http: reqwest::Client,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ChatError::Config("api key is empty".into()));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ChatError::Config(e.to_string()))?;
        Ok(Self { config, http })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Send `prompt` as a user message behind [`DEFAULT_SYSTEM_PROMPT`] and
    /// return the first generated message.
    pub async fn ask(&self, prompt: &str) -> Result<String> {
        self.complete(vec![
            ChatMessage::system(DEFAULT_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ])
        .await
    }

    /// Send an arbitrary message list and return the first generated message.
    ///
    /// Any non-2xx status, undecodable body, or empty `choices` array is an
    /// error; the caller decides whether that is fatal.
    pub async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
        };

        tracing::debug!(model = %request.model, messages = request.messages.len(), "sending completion request");

        let resp = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(ChatError::from_transport)?;

        let status = resp.status();
        let body = resp.text().await.map_err(ChatError::from_transport)?;

        if !status.is_success() {
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|source| ChatError::Decode { body, source })?;

        if let Some(usage) = parsed.usage {
            tracing::debug!(total_tokens = usage.total_tokens, "completion finished");
        }

        parsed
            .first_content()
            .map(str::to_owned)
            .ok_or(ChatError::EmptyResponse)
    }
}
