//! The `q` command: answer a question with retrieved context

use ragex_core::Result;
use ragex_rag::QueryOrchestrator;
use std::sync::Arc;

/// Question asked when `q` is run without a message
pub const DEFAULT_QUESTION: &str = "What can you tell me from the indexed documents?";

/// Answers questions through the retrieve-then-generate flow
pub struct AssistantCommand {
    orchestrator: Arc<QueryOrchestrator>,
}

impl AssistantCommand {
    pub fn new(orchestrator: Arc<QueryOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Ask a question to the assistant, falling back to [`DEFAULT_QUESTION`].
    /// The message is forwarded as given.
    pub async fn question(&self, message: Option<&str>) -> Result<String> {
        let message = message.unwrap_or(DEFAULT_QUESTION);
        tracing::info!(question = message, "answering question");
        self.orchestrator.answer(message).await
    }
}
