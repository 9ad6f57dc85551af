//! Retrieve-then-generate query orchestrator

use std::fmt;
use std::sync::Arc;

use ragex_core::{
    ChatClient, Document, PromptTemplate, Result, SearchRequest, TextStream, VectorStore,
};

/// Joins a vector store, a prompt template and a chat client.
///
/// Every failure from either adapter is returned unchanged; there is no retry
/// and no fallback to answering without context.
#[derive(Clone)]
pub struct QueryOrchestrator {
    chat: ChatClient,
    store: Arc<dyn VectorStore>,
    template: Arc<PromptTemplate>,
    top_k: usize,
}

impl QueryOrchestrator {
    /// Number of documents retrieved per question unless overridden
    pub const DEFAULT_TOP_K: usize = 3;

    /// Template placeholder receiving the user's message
    pub const INPUT_KEY: &'static str = "input";

    /// Template placeholder receiving the retrieved document text
    pub const DOCUMENTS_KEY: &'static str = "documents";

    pub fn new(chat: ChatClient, store: Arc<dyn VectorStore>, template: PromptTemplate) -> Self {
        Self {
            chat,
            store,
            template: Arc::new(template),
            top_k: Self::DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn chat_client(&self) -> &ChatClient {
        &self.chat
    }

    /// Fetch the documents most similar to `message`
    pub async fn retrieve(&self, message: &str) -> Result<Vec<Document>> {
        let request = SearchRequest::new(message).with_top_k(self.top_k);
        let documents = self.store.similarity_search(&request).await?;
        tracing::debug!(store = self.store.name(), count = documents.len(), "retrieved documents");
        Ok(documents)
    }

    /// Fill the template with the message and the documents' text, one document per line
    pub fn fill_template(&self, message: &str, documents: &[Document]) -> Result<String> {
        let joined = documents
            .iter()
            .map(|doc| doc.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        self.template
            .render(&[(Self::INPUT_KEY, message), (Self::DOCUMENTS_KEY, joined.as_str())])
    }

    /// Retrieve and fill the template without calling the model
    pub async fn build_prompt(&self, message: &str) -> Result<String> {
        let documents = self.retrieve(message).await?;
        self.fill_template(message, &documents)
    }

    /// Answer `message` using retrieved documents as context
    #[tracing::instrument(skip(self), fields(top_k = self.top_k))]
    pub async fn answer(&self, message: &str) -> Result<String> {
        let prompt = self.build_prompt(message).await?;
        self.chat.prompt().user(prompt).call().await
    }

    /// Stream the model's answer to `message` directly, without retrieval
    #[tracing::instrument(skip(self))]
    pub async fn answer_stream(&self, message: &str) -> Result<TextStream> {
        self.chat.prompt().user(message).stream().await
    }
}

impl fmt::Debug for QueryOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOrchestrator")
            .field("model", &self.chat.model_id())
            .field("store", &self.store.name())
            .field("template", &self.template.source())
            .field("top_k", &self.top_k)
            .finish()
    }
}
