//! Ollama HTTP client implementation

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use ragex_core::{ChatModel, EmbeddingModel, Error, Prompt, Result, TextStream};

use crate::config::OllamaConfig;
use crate::ndjson::{self, ChatChunk};

/// Ollama client serving both chat and embedding requests
#[derive(Clone)]
pub struct OllamaClient {
    config: OllamaConfig,
    client: Client,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaClient {
    /// Create a new Ollama client from configuration
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn chat_request<'a>(&'a self, prompt: &'a Prompt, stream: bool) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.chat_model,
            messages: prompt
                .messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            stream,
            options: ChatOptions {
                temperature: self.config.temperature,
            },
        }
    }

    /// POST a chat request and check the status; the body is left unread
    async fn send_chat(&self, prompt: &Prompt, stream: bool) -> Result<Response> {
        if prompt.is_empty() {
            return Err(Error::InvalidInput("prompt has no messages".to_string()));
        }

        let url = format!("{}/api/chat", self.config.base_url);
        tracing::debug!(model = %self.config.chat_model, stream, "sending chat request");

        let response = self
            .client
            .post(&url)
            .json(&self.chat_request(prompt, stream))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, url = %url, "Ollama chat endpoint unreachable");
                Error::GenerationUnavailable(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(%status, "Ollama chat request rejected");
            return Err(Error::GenerationUnavailable(format!(
                "Ollama chat request failed with status {}: {}",
                status, error_text
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatModel for OllamaClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        let response = self.send_chat(prompt, false).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::GenerationUnavailable(e.to_string()))?;

        let chunk = ChatChunk::parse(body.trim_ascii())?;
        if chunk.message.is_none() {
            return Err(Error::GenerationUnavailable(
                "Ollama chat response carried no message".to_string(),
            ));
        }
        Ok(chunk.into_text())
    }

    async fn stream(&self, prompt: &Prompt) -> Result<TextStream> {
        let response = self.send_chat(prompt, true).await?;
        Ok(ndjson::decode_text(Box::pin(response.bytes_stream())).boxed())
    }

    fn model_id(&self) -> &str {
        &self.config.chat_model
    }
}

#[async_trait]
impl EmbeddingModel for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embed", self.config.base_url);
        let request = EmbedRequest {
            model: &self.config.embedding_model,
            input: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::GenerationUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::GenerationUnavailable(format!(
                "Ollama embed request failed with status {}: {}",
                status, error_text
            )));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::GenerationUnavailable(format!("malformed embed response: {}", e)))?;

        embed_response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| Error::GenerationUnavailable("Ollama returned no embedding".to_string()))
    }

    fn model_id(&self) -> &str {
        &self.config.embedding_model
    }
}
