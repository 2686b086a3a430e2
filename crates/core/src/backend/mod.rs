//! # Model Backend Boundary
//!
//! The executor depends on one abstract operation: complete a prompt under
//! a role context and return text. Credentials are supplied per request;
//! nothing here is global state.

pub mod groq;

use async_trait::async_trait;

use crate::error::PipelineError;

pub use groq::GroqBackend;

/// One completion call: role context as the system message, the composed
/// task prompt as the user message.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub model: String,
    pub temperature: f32,
}

/// Abstract language-model backend.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, PipelineError>;
}
