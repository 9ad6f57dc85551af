//! Core traits and types for ragex
//!
//! This crate defines the seams between the chat model, the vector store and the
//! query orchestrator. Concrete adapters live in `ragex-ollama` and `ragex-rag`.

pub mod error;
pub mod llm;
pub mod prompt;
pub mod vector_store;

#[cfg(any(test, feature = "testing"))]
pub mod testing;


pub use error::{Error, Result};
pub use llm::{ChatClient, ChatModel, EmbeddingModel, PromptSpec, TextStream};
pub use prompt::{Message, Prompt, PromptTemplate, Role};
pub use vector_store::{Document, SearchRequest, VectorStore, rank_documents};
