//! Ollama integration for ragex
//!
//! This crate provides the Ollama implementation of the `ChatModel` and
//! `EmbeddingModel` traits.

mod client;
mod config;
mod ndjson;

#[cfg(test)]
mod tests;

pub use client::OllamaClient;
pub use config::OllamaConfig;

// Re-export core types for convenience
pub use ragex_core::{ChatModel, EmbeddingModel, Error, Prompt, Result, TextStream};
