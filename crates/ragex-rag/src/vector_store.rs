//! Vector store implementations

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{PointId, ScoredPoint, SearchPointsBuilder, Value};
use std::path::Path;
use std::sync::{Arc, RwLock};

use ragex_core::{
    Document, EmbeddingModel, Error, Result, SearchRequest, VectorStore, rank_documents,
};

use crate::config::QdrantConfig;

/// Local in-memory vector store scored by keyword overlap
pub struct LocalVectorStore {
    documents: RwLock<Vec<Document>>,
}

impl LocalVectorStore {
    /// Create a new, empty local vector store
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
        }
    }

    /// Load documents from a JSON array such as `[{"id": "1", "content": "..."}]`.
    /// Entries without an id get a random one.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("cannot read seed documents {}: {}", path.display(), e))
        })?;
        let documents: Vec<Document> = serde_json::from_str(&raw)?;

        let store = Self::new();
        let count = store.add(documents)?;
        tracing::info!(count, path = %path.display(), "seeded in-memory vector store");
        Ok(store)
    }

    /// Insert documents, returning how many were added
    pub fn add(&self, documents: Vec<Document>) -> Result<usize> {
        let mut docs = self
            .documents
            .write()
            .map_err(|e| Error::RetrievalUnavailable(format!("Lock error: {}", e)))?;

        let count = documents.len();
        for mut document in documents {
            if document.id.is_empty() {
                document.id = uuid::Uuid::new_v4().to_string();
            }
            document.score = None;
            docs.push(document);
        }
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.documents.read().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fraction of query words that occur in the content
    fn text_similarity(query: &str, content: &str) -> f32 {
        let query_lower = query.to_lowercase();
        let content_lower = content.to_lowercase();

        let query_words: Vec<&str> = query_lower.split_whitespace().collect();
        if query_words.is_empty() {
            return 0.0;
        }

        let matches = query_words
            .iter()
            .filter(|word| content_lower.contains(*word))
            .count();

        matches as f32 / query_words.len() as f32
    }
}

impl Default for LocalVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn similarity_search(&self, request: &SearchRequest) -> Result<Vec<Document>> {
        request.validate()?;

        let docs = self
            .documents
            .read()
            .map_err(|e| Error::RetrievalUnavailable(format!("Lock error: {}", e)))?;

        let scored: Vec<Document> = docs
            .iter()
            .map(|doc| {
                let score = Self::text_similarity(&request.query, &doc.content);
                doc.clone().with_score(score)
            })
            .collect();

        Ok(rank_documents(scored, request))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Qdrant-backed vector store.
///
/// The query is embedded with the configured model, then matched against the
/// collection's points. The payload entry named by `content_key` becomes the
/// document text; every other payload entry becomes metadata.
pub struct QdrantVectorStore {
    client: Qdrant,
    embedder: Arc<dyn EmbeddingModel>,
    collection: String,
    content_key: String,
}

impl QdrantVectorStore {
    /// Build a store for the configured collection.
    ///
    /// No request is sent here; the server version check is skipped and an
    /// unreachable server surfaces on the first search.
    pub fn connect(config: &QdrantConfig, embedder: Arc<dyn EmbeddingModel>) -> Result<Self> {
        let client = Qdrant::from_url(&config.url)
            .api_key(config.api_key.clone())
            .skip_compatibility_check()
            .build()
            .map_err(|e| Error::Configuration(format!("invalid Qdrant client settings: {}", e)))?;

        Ok(Self {
            client,
            embedder,
            collection: config.collection.clone(),
            content_key: config.content_key.clone(),
        })
    }

    fn to_document(&self, point: ScoredPoint) -> Document {
        let id = point.id.map(point_id_to_string).unwrap_or_default();
        let mut payload = point.payload;

        let content = match payload.remove(&self.content_key).and_then(|v| v.kind) {
            Some(Kind::StringValue(text)) => text,
            Some(other) => payload_to_json(Value { kind: Some(other) }).to_string(),
            None => {
                tracing::warn!(id = %id, key = %self.content_key, "point has no content payload");
                String::new()
            }
        };

        let metadata: serde_json::Map<String, serde_json::Value> = payload
            .into_iter()
            .map(|(key, value)| (key, payload_to_json(value)))
            .collect();

        Document::new(id, content)
            .with_metadata(serde_json::Value::Object(metadata))
            .with_score(point.score)
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn similarity_search(&self, request: &SearchRequest) -> Result<Vec<Document>> {
        request.validate()?;

        let vector = self.embedder.embed(&request.query).await.map_err(|e| {
            tracing::warn!(error = %e, "query embedding failed");
            Error::RetrievalUnavailable(format!("query embedding failed: {}", e))
        })?;

        let mut search = SearchPointsBuilder::new(&self.collection, vector, request.top_k as u64)
            .with_payload(true);
        if let Some(threshold) = request.similarity_threshold {
            search = search.score_threshold(threshold);
        }

        let response = self.client.search_points(search).await.map_err(|e| {
            tracing::warn!(error = %e, collection = %self.collection, "Qdrant search failed");
            Error::RetrievalUnavailable(e.to_string())
        })?;

        let documents = response
            .result
            .into_iter()
            .map(|point| self.to_document(point))
            .collect();

        Ok(rank_documents(documents, request))
    }

    fn name(&self) -> &str {
        "qdrant"
    }
}

fn point_id_to_string(id: PointId) -> String {
    match id.point_id_options {
        Some(PointIdOptions::Uuid(uuid)) => uuid,
        Some(PointIdOptions::Num(num)) => num.to_string(),
        None => String::new(),
    }
}

/// Convert a Qdrant payload value into plain JSON
fn payload_to_json(value: Value) -> serde_json::Value {
    match value.kind {
        None | Some(Kind::NullValue(_)) => serde_json::Value::Null,
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(b),
        Some(Kind::IntegerValue(i)) => serde_json::Value::from(i),
        Some(Kind::DoubleValue(d)) => serde_json::Number::from_f64(d)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Some(Kind::StringValue(s)) => serde_json::Value::String(s),
        Some(Kind::ListValue(list)) => {
            serde_json::Value::Array(list.values.into_iter().map(payload_to_json).collect())
        }
        Some(Kind::StructValue(fields)) => serde_json::Value::Object(
            fields
                .fields
                .into_iter()
                .map(|(key, value)| (key, payload_to_json(value)))
                .collect(),
        ),
    }
}
