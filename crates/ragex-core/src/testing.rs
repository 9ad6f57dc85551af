//! Scripted models and stores for tests

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::sync::Mutex;

use crate::{
    ChatModel, Document, EmbeddingModel, Error, Prompt, Result, SearchRequest, TextStream,
    VectorStore, rank_documents,
};

enum Reply {
    Text(String),
    Offline,
    Misconfigured,
}

/// Chat model that answers every prompt with the same text and records what it was sent
pub struct StubChatModel {
    reply: Reply,
    prompts: Mutex<Vec<Prompt>>,
}

impl StubChatModel {
    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(reply: impl Into<String>) -> Self {
        Self::with_reply(Reply::Text(reply.into()))
    }

    /// A model whose endpoint is unreachable
    pub fn unavailable() -> Self {
        Self::with_reply(Reply::Offline)
    }

    /// A model that rejects every prompt with a local configuration error
    pub fn misconfigured() -> Self {
        Self::with_reply(Reply::Misconfigured)
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn record(&self, prompt: &Prompt) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Offline => Err(Error::GenerationUnavailable("stub model is offline".to_string())),
            Reply::Misconfigured => {
                Err(Error::Configuration("stub model is misconfigured".to_string()))
            }
        }
    }
}

#[async_trait]
impl ChatModel for StubChatModel {
    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        self.record(prompt)
    }

    async fn stream(&self, prompt: &Prompt) -> Result<TextStream> {
        let reply = self.record(prompt)?;
        let fragments: Vec<Result<String>> = reply
            .split_inclusive(' ')
            .map(|fragment| Ok(fragment.to_string()))
            .collect();
        Ok(stream::iter(fragments).boxed())
    }

    fn model_id(&self) -> &str {
        "stub-chat"
    }
}

/// Vector store returning a fixed set of documents for any query
pub struct StubVectorStore {
    documents: Option<Vec<Document>>,
    requests: Mutex<Vec<SearchRequest>>,
}

impl StubVectorStore {
    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            documents: Some(documents),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Documents built from bare contents, scored in descending order
    pub fn with_contents(contents: &[&str]) -> Self {
        let count = contents.len() as f32;
        let documents = contents
            .iter()
            .enumerate()
            .map(|(i, content)| Document::new(format!("doc-{}", i), *content).with_score(1.0 - i as f32 / count))
            .collect();
        Self::with_documents(documents)
    }

    /// A store whose backend is unreachable
    pub fn unavailable() -> Self {
        Self {
            documents: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl VectorStore for StubVectorStore {
    async fn similarity_search(&self, request: &SearchRequest) -> Result<Vec<Document>> {
        request.validate()?;
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let documents = self
            .documents
            .clone()
            .ok_or_else(|| Error::RetrievalUnavailable("stub store is offline".to_string()))?;
        Ok(rank_documents(documents, request))
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Embedding model returning the same vector for every input
pub struct StubEmbeddingModel {
    vector: Option<Vec<f32>>,
}

impl StubEmbeddingModel {
    pub fn returning(vector: Vec<f32>) -> Self {
        Self { vector: Some(vector) }
    }

    pub fn unavailable() -> Self {
        Self { vector: None }
    }
}

#[async_trait]
impl EmbeddingModel for StubEmbeddingModel {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.vector
            .clone()
            .ok_or_else(|| Error::GenerationUnavailable("stub embedder is offline".to_string()))
    }

    fn model_id(&self) -> &str {
        "stub-embed"
    }
}
