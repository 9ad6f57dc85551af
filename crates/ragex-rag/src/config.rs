//! Qdrant configuration

use ragex_core::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Connection settings for the Qdrant vector store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QdrantConfig {
    pub url: String,
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,
    pub collection: String,
    /// Payload key holding the document text
    pub content_key: String,
}

impl QdrantConfig {
    pub const DEFAULT_URL: &'static str = "http://localhost:6334";
    pub const DEFAULT_COLLECTION: &'static str = "vector_store";
    pub const DEFAULT_CONTENT_KEY: &'static str = "doc_content";

    /// Read configuration from a variable source such as the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let url = lookup("QDRANT_URL").unwrap_or_else(|| Self::DEFAULT_URL.to_string());
        Url::parse(&url).map_err(|e| {
            Error::Configuration(format!("QDRANT_URL '{}' is not a valid URL: {}", url, e))
        })?;

        let collection = lookup("QDRANT_COLLECTION").unwrap_or_else(|| Self::DEFAULT_COLLECTION.to_string());
        if collection.trim().is_empty() {
            return Err(Error::Configuration("QDRANT_COLLECTION must not be empty".to_string()));
        }

        Ok(Self {
            url,
            api_key: lookup("QDRANT_API_KEY").filter(|key| !key.is_empty()),
            collection,
            content_key: lookup("QDRANT_CONTENT_KEY").unwrap_or_else(|| Self::DEFAULT_CONTENT_KEY.to_string()),
        })
    }
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: Self::DEFAULT_URL.to_string(),
            api_key: None,
            collection: Self::DEFAULT_COLLECTION.to_string(),
            content_key: Self::DEFAULT_CONTENT_KEY.to_string(),
        }
    }
}
