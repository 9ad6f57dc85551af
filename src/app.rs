//! Wiring of adapters into a query orchestrator

use std::sync::Arc;

use ragex_core::{ChatClient, PromptTemplate, Result, VectorStore};
use ragex_ollama::OllamaClient;
use ragex_rag::{LocalVectorStore, QdrantVectorStore, QueryOrchestrator};

use crate::config::{AppConfig, StoreKind};

/// Build the orchestrator described by `config`.
///
/// The prompt template is loaded eagerly so a missing file fails startup.
pub fn build_orchestrator(config: &AppConfig) -> Result<QueryOrchestrator> {
    let template = PromptTemplate::load(&config.template_path)?;
    let ollama = Arc::new(OllamaClient::new(config.ollama.clone())?);

    let store: Arc<dyn VectorStore> = match &config.store {
        StoreKind::Qdrant => Arc::new(QdrantVectorStore::connect(&config.qdrant, ollama.clone())?),
        StoreKind::Memory { seed: Some(path) } => Arc::new(LocalVectorStore::from_json_file(path)?),
        StoreKind::Memory { seed: None } => Arc::new(LocalVectorStore::new()),
    };

    tracing::info!(
        chat_model = %config.ollama.chat_model,
        store = store.name(),
        top_k = config.top_k,
        template = %config.template_path.display(),
        "orchestrator ready"
    );

    Ok(QueryOrchestrator::new(ChatClient::new(ollama), store, template).with_top_k(config.top_k))
}
