//! Ollama configuration

use ragex_core::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for the Ollama client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub base_url: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub temperature: Option<f32>,
}

impl OllamaConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:11434";
    pub const DEFAULT_CHAT_MODEL: &'static str = "llama3.2";
    pub const DEFAULT_EMBEDDING_MODEL: &'static str = "mxbai-embed-large";

    /// Read configuration from a variable source such as the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup("OLLAMA_BASE_URL").unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string());
        Url::parse(&base_url).map_err(|e| {
            Error::Configuration(format!("OLLAMA_BASE_URL '{}' is not a valid URL: {}", base_url, e))
        })?;

        let chat_model = lookup("OLLAMA_CHAT_MODEL").unwrap_or_else(|| Self::DEFAULT_CHAT_MODEL.to_string());
        let embedding_model = lookup("OLLAMA_EMBEDDING_MODEL")
            .unwrap_or_else(|| Self::DEFAULT_EMBEDDING_MODEL.to_string());

        let temperature = lookup("OLLAMA_TEMPERATURE")
            .map(|raw| {
                raw.parse::<f32>().map_err(|_| {
                    Error::Configuration(format!("OLLAMA_TEMPERATURE '{}' is not a number", raw))
                })
            })
            .transpose()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            chat_model,
            embedding_model,
            temperature,
        })
    }

    /// Create configuration with explicit values
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            chat_model: Self::DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: Self::DEFAULT_EMBEDDING_MODEL.to_string(),
            temperature: None,
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = OllamaConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, OllamaConfig::default());
    }

    #[test]
    fn test_overrides_and_trailing_slash() {
        let config = OllamaConfig::from_lookup(lookup_from(&[
            ("OLLAMA_BASE_URL", "http://gpu-box:11434/"),
            ("OLLAMA_CHAT_MODEL", "mistral"),
            ("OLLAMA_TEMPERATURE", "0.2"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://gpu-box:11434");
        assert_eq!(config.chat_model, "mistral");
        assert_eq!(config.embedding_model, OllamaConfig::DEFAULT_EMBEDDING_MODEL);
        assert_eq!(config.temperature, Some(0.2));
    }

    #[test]
    fn test_invalid_url() {
        let err = OllamaConfig::from_lookup(lookup_from(&[("OLLAMA_BASE_URL", "not a url")])).unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn test_invalid_temperature() {
        let err = OllamaConfig::from_lookup(lookup_from(&[("OLLAMA_TEMPERATURE", "warm")])).unwrap_err();
        assert!(err.to_string().contains("OLLAMA_TEMPERATURE"));
    }
}
