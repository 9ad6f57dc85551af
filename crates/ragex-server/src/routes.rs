use axum::{
    Router,
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use futures::TryStreamExt;
use ragex_core::Result;
use ragex_rag::QueryOrchestrator;
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;

use crate::ApiError;

/// Prompt streamed by `GET /ollama`
pub const DEMO_PROMPT: &str = "Tell me about developer jokes";

#[derive(Clone)]
struct AppState {
    orchestrator: Arc<QueryOrchestrator>,
}

pub fn router(orchestrator: Arc<QueryOrchestrator>) -> Router {
    Router::new()
        .route("/ollama", get(ollama_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { orchestrator })
}

/// Bind `addr` and serve until Ctrl-C
pub async fn serve(addr: SocketAddr, orchestrator: Arc<QueryOrchestrator>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, router(orchestrator))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Stream the model's answer to the demo prompt, fragments forwarded as they arrive.
/// Dropping the response body (client disconnect) drops the upstream stream.
async fn ollama_handler(State(state): State<AppState>) -> std::result::Result<Response, ApiError> {
    let fragments = state
        .orchestrator
        .answer_stream(DEMO_PROMPT)
        .await?
        .inspect_err(|e| tracing::warn!(error = %e, "chat stream aborted"));

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(fragments),
    )
        .into_response())
}
