//! Streaming client for OpenAI-compatible chat completion endpoints.

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Serialize;

use super::sse::delta_stream;
use super::{ChatMessage, FragmentStream, TextGenerator};
use crate::config::LlmConfig;
use crate::error::GenerationError;

pub struct OpenAiCompatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

impl OpenAiCompatClient {
    pub fn new(config: &LlmConfig) -> Result<Self, GenerationError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl TextGenerator for OpenAiCompatClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<FragmentStream, GenerationError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
            stream: true,
        };

        log::info!("[LLM] Streaming chat completion from {} (model: {})", self.chat_url(), self.model);

        let resp = self
            .client
            .post(self.chat_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            log::error!("[LLM] Inference endpoint returned HTTP {}: {}", status, body);
            return Err(GenerationError::Status { status, body });
        }

        let bytes = resp
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| GenerationError::Body(e.to_string())));

        Ok(delta_stream(bytes).boxed())
    }
}
