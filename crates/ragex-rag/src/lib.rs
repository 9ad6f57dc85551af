//! Retrieval-augmented generation for ragex
//!
//! This crate provides the vector store adapters and the query orchestrator
//! that joins retrieval, prompt templating and generation.

mod config;
mod engine;
mod vector_store;


pub use config::QdrantConfig;
pub use engine::QueryOrchestrator;
pub use vector_store::{LocalVectorStore, QdrantVectorStore};

// Re-export core types for convenience
pub use ragex_core::{
    ChatClient, Document, Error, PromptTemplate, Result, SearchRequest, TextStream, VectorStore,
};
