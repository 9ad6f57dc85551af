//! Chat and embedding model traits, plus the fluent chat client

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::sync::Arc;

use crate::{Message, Prompt, Result};

/// Lazy, single-pass sequence of generated text fragments.
///
/// Dropping the stream stops generation and releases the underlying connection.
pub type TextStream = BoxStream<'static, Result<String>>;

/// Trait for chat/completion models (e.g., Ollama)
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate the full answer for a prompt
    async fn complete(&self, prompt: &Prompt) -> Result<String>;

    /// Start generating and return the fragments as they arrive
    async fn stream(&self, prompt: &Prompt) -> Result<TextStream>;

    /// Get the model name being used
    fn model_id(&self) -> &str;
}

/// Trait for models that turn text into an embedding vector
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn model_id(&self) -> &str;
}

/// Fluent front end over a [`ChatModel`].
///
/// ```ignore
/// let answer = client.prompt().user("Tell me a joke").call().await?;
/// let fragments = client.prompt().user("Tell me a joke").stream().await?;
/// ```
#[derive(Clone)]
pub struct ChatClient {
    model: Arc<dyn ChatModel>,
    default_system: Option<String>,
}

impl ChatClient {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            default_system: None,
        }
    }

    /// System text prepended to every prompt built through this client
    pub fn with_default_system(mut self, system: impl Into<String>) -> Self {
        self.default_system = Some(system.into());
        self
    }

    pub fn model_id(&self) -> &str {
        self.model.model_id()
    }

    /// Start an empty request
    pub fn prompt(&self) -> PromptSpec<'_> {
        PromptSpec {
            client: self,
            prompt: Prompt::default(),
        }
    }

    /// Start a request from an already built prompt
    pub fn prompt_with(&self, prompt: Prompt) -> PromptSpec<'_> {
        PromptSpec { client: self, prompt }
    }

    fn finalize(&self, mut prompt: Prompt) -> Prompt {
        if let Some(system) = &self.default_system {
            prompt.messages.insert(0, Message::system(system.clone()));
        }
        prompt
    }
}

/// A request being assembled through [`ChatClient::prompt`]
pub struct PromptSpec<'a> {
    client: &'a ChatClient,
    prompt: Prompt,
}

impl PromptSpec<'_> {
    pub fn system(mut self, text: impl Into<String>) -> Self {
        self.prompt.push(Message::system(text));
        self
    }

    pub fn user(mut self, text: impl Into<String>) -> Self {
        self.prompt.push(Message::user(text));
        self
    }

    pub fn message(mut self, message: Message) -> Self {
        self.prompt.push(message);
        self
    }

    /// The prompt that will be sent, including the client's default system text
    pub fn build(&self) -> Prompt {
        self.client.finalize(self.prompt.clone())
    }

    /// Send the prompt and wait for the complete answer
    pub async fn call(self) -> Result<String> {
        let prompt = self.client.finalize(self.prompt);
        self.client.model.complete(&prompt).await
    }

    /// Send the prompt and return the answer as a stream of fragments
    pub async fn stream(self) -> Result<TextStream> {
        let prompt = self.client.finalize(self.prompt);
        self.client.model.stream(&prompt).await
    }
}
