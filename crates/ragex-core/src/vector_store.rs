//! Vector store trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A document returned by a similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub id: String,
    pub content: String,
    #[serde(default = "empty_metadata")]
    pub metadata: serde_json::Value,
    #[serde(default)]
    pub score: Option<f32>,
}

fn empty_metadata() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: empty_metadata(),
            score: None,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    /// The `source` metadata entry, when the store recorded one
    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").and_then(|v| v.as_str())
    }
}

/// Parameters of a similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub top_k: usize,
    pub similarity_threshold: Option<f32>,
}

impl SearchRequest {
    pub const DEFAULT_TOP_K: usize = 4;

    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: Self::DEFAULT_TOP_K,
            similarity_threshold: None,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = Some(threshold);
        self
    }

    /// Reject requests no store can answer
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::InvalidInput("top_k must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// Trait for vector stores (e.g., Qdrant)
///
/// Implementations return at most `top_k` documents ordered by descending
/// score and report an unreachable backend as [`Error::RetrievalUnavailable`].
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Search for documents similar to the request's query
    async fn similarity_search(&self, request: &SearchRequest) -> Result<Vec<Document>>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

/// Apply a request's threshold, ordering and `top_k` limit to raw hits.
///
/// Documents without a score sort last. The sort is stable so equal scores keep
/// the backend's order.
pub fn rank_documents(mut documents: Vec<Document>, request: &SearchRequest) -> Vec<Document> {
    if let Some(threshold) = request.similarity_threshold {
        documents.retain(|doc| doc.score.is_some_and(|score| score >= threshold));
    }

    documents.sort_by(|a, b| {
        let a = a.score.unwrap_or(f32::NEG_INFINITY);
        let b = b.score.unwrap_or(f32::NEG_INFINITY);
        b.total_cmp(&a)
    });

    documents.truncate(request.top_k);
    documents
}
