//! # Groq Backend
//!
//! `LlmBackend` over the OpenAI-compatible chat-completions endpoint.
//! Works against Groq by default and any compatible server via a base URL
//! override.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CompletionRequest, LlmBackend};
use crate::error::PipelineError;
use crate::models::{Credentials, LlmProvider, ModelConfig};

#[derive(Debug)]
pub struct GroqBackend {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GroqBackend {
    /// Build a client for this request's credentials. Fails fast on blank
    /// keys so no task ever starts without usable configuration.
    pub fn new(credentials: &Credentials) -> Result<Self, PipelineError> {
        credentials.validate()?;
        Ok(Self {
            client: reqwest::Client::new(),
            api_key: credentials.api_key.clone(),
            base_url: LlmProvider::Groq.default_base_url().to_string(),
        })
    }

    /// Build a client honoring the model binding: the request's base URL
    /// override when present, otherwise the bound provider's default
    /// endpoint.
    pub fn for_model(
        credentials: &Credentials,
        model: &ModelConfig,
    ) -> Result<Self, PipelineError> {
        let base_url = model
            .base_url
            .clone()
            .unwrap_or_else(|| model.provider.default_base_url().to_string());
        tracing::debug!(
            provider = model.provider.display_name(),
            base_url = %base_url,
            "model backend configured"
        );
        Ok(Self::new(credentials)?.with_base_url(&base_url))
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl LlmBackend for GroqBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<String, PipelineError> {
        let body = ChatRequest {
            model: &request.model,
            temperature: request.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::BackendUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PipelineError::BackendUnavailable(format!(
                "{status}: {detail}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::BackendUnavailable(format!("bad response body: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                PipelineError::BackendUnavailable("response contained no choices".to_string())
            })
    }
}
