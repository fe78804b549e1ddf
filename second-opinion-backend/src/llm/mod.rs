//! Text-generation capability used by the opinion relay.
//!
//! Any backend that turns role-tagged messages into a stream of text deltas
//! can implement [`TextGenerator`]. The production implementation talks to an
//! OpenAI-compatible `/chat/completions` endpoint (Ollama, vLLM, llama.cpp, ...).

pub mod openai;
pub mod sse;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde::Serialize;

use crate::error::GenerationError;

pub use openai::OpenAiCompatClient;

/// Incremental text deltas from one generation session. Deltas may be empty.
pub type FragmentStream = BoxStream<'static, Result<String, GenerationError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier, for logs and the health endpoint
    fn model(&self) -> &str;

    /// Start a streaming generation session.
    ///
    /// Errors returned here happen before any text was produced (connection
    /// refused, non-success status). Errors inside the stream end the session.
    async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<FragmentStream, GenerationError>;
}
