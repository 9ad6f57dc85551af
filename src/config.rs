//! Application configuration assembled from the environment

use ragex_core::{Error, Result};
use ragex_ollama::OllamaConfig;
use ragex_rag::{QdrantConfig, QueryOrchestrator};
use serde::Serialize;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Which vector store backs retrieval
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum StoreKind {
    Qdrant,
    /// In-memory store, optionally seeded from a JSON file of documents
    Memory { seed: Option<PathBuf> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppConfig {
    pub ollama: OllamaConfig,
    pub qdrant: QdrantConfig,
    pub store: StoreKind,
    pub top_k: usize,
    pub template_path: PathBuf,
    pub server_addr: SocketAddr,
}

impl AppConfig {
    pub const DEFAULT_TEMPLATE_PATH: &'static str = "prompts/prompt.st";
    pub const DEFAULT_SERVER_ADDR: &'static str = "127.0.0.1:8080";

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let ollama = OllamaConfig::from_lookup(&lookup)?;
        let qdrant = QdrantConfig::from_lookup(&lookup)?;

        let store = match lookup("VECTOR_STORE").as_deref().map(str::trim) {
            None | Some("") | Some("qdrant") => StoreKind::Qdrant,
            Some("memory") => StoreKind::Memory {
                seed: lookup("VECTOR_STORE_SEED")
                    .filter(|path| !path.is_empty())
                    .map(PathBuf::from),
            },
            Some(other) => {
                return Err(Error::Configuration(format!(
                    "VECTOR_STORE '{}' is not one of: qdrant, memory",
                    other
                )));
            }
        };

        let top_k = match lookup("RAG_TOP_K") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(0) => {
                    return Err(Error::Configuration("RAG_TOP_K must be at least 1".to_string()));
                }
                Ok(value) => value,
                Err(_) => {
                    return Err(Error::Configuration(format!(
                        "RAG_TOP_K '{}' is not a positive integer",
                        raw
                    )));
                }
            },
            None => QueryOrchestrator::DEFAULT_TOP_K,
        };

        let template_path = lookup("PROMPT_TEMPLATE_PATH")
            .unwrap_or_else(|| Self::DEFAULT_TEMPLATE_PATH.to_string())
            .into();

        let raw_addr = lookup("SERVER_ADDR").unwrap_or_else(|| Self::DEFAULT_SERVER_ADDR.to_string());
        let server_addr = raw_addr.parse::<SocketAddr>().map_err(|e| {
            Error::Configuration(format!("SERVER_ADDR '{}' is not a socket address: {}", raw_addr, e))
        })?;

        Ok(Self {
            ollama,
            qdrant,
            store,
            top_k,
            template_path,
            server_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_yaml_snapshot;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_yaml_snapshot!(config, @r###"
        ---
        ollama:
          base_url: "http://localhost:11434"
          chat_model: llama3.2
          embedding_model: mxbai-embed-large
          temperature: ~
        qdrant:
          url: "http://localhost:6334"
          collection: vector_store
          content_key: doc_content
        store:
          kind: qdrant
        top_k: 3
        template_path: prompts/prompt.st
        server_addr: "127.0.0.1:8080"
        "###);
    }

    #[test]
    fn test_memory_store_with_seed() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("VECTOR_STORE", "memory"),
            ("VECTOR_STORE_SEED", "data/docs.json"),
            ("RAG_TOP_K", "5"),
            ("SERVER_ADDR", "0.0.0.0:9000"),
        ]))
        .unwrap();

        assert_eq!(
            config.store,
            StoreKind::Memory {
                seed: Some(PathBuf::from("data/docs.json"))
            }
        );
        assert_eq!(config.top_k, 5);
        assert_eq!(config.server_addr.port(), 9000);
    }

    #[test]
    fn test_invalid_values_are_configuration_errors() {
        for pairs in [
            [("RAG_TOP_K", "0")],
            [("RAG_TOP_K", "three")],
            [("VECTOR_STORE", "pinecone")],
            [("SERVER_ADDR", "localhost")],
            [("OLLAMA_BASE_URL", "not a url")],
        ] {
            let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
            assert_eq!(err.kind(), "configuration", "{:?}", pairs);
        }
    }
}
