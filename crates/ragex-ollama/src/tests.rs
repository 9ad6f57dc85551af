//! Tests for the Ollama client against an in-process mock server

#[cfg(test)]
mod snapshot_tests {
    use crate::{OllamaClient, OllamaConfig};
    use insta::assert_yaml_snapshot;

    #[test]
    fn test_config_snapshot() {
        let config = OllamaConfig {
            base_url: "http://localhost:11434".to_string(),
            chat_model: "llama3.2".to_string(),
            embedding_model: "mxbai-embed-large".to_string(),
            temperature: None,
        };

        assert_yaml_snapshot!(config, @r###"
        ---
        base_url: "http://localhost:11434"
        chat_model: llama3.2
        embedding_model: mxbai-embed-large
        temperature: ~
        "###);
    }

    #[test]
    fn test_model_ids() {
        use ragex_core::{ChatModel, EmbeddingModel};

        let client = OllamaClient::new(OllamaConfig::default()).unwrap();
        assert_eq!(ChatModel::model_id(&client), OllamaConfig::DEFAULT_CHAT_MODEL);
        assert_eq!(EmbeddingModel::model_id(&client), OllamaConfig::DEFAULT_EMBEDDING_MODEL);
    }
}

#[cfg(test)]
mod mock_server_tests {
    use crate::{OllamaClient, OllamaConfig};
    use axum::{Json, Router, body::Body, http::StatusCode, routing::post};
    use futures::{TryStreamExt, stream};
    use ragex_core::{ChatModel, EmbeddingModel, Prompt};
    use serde_json::{Value, json};
    use std::convert::Infallible;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const STREAMED_BODY: &str = concat!(
        "{\"message\":{\"role\":\"assistant\",\"content\":\"Why \"},\"done\":false}\n",
        "{\"message\":{\"role\":\"assistant\",\"content\":\"did the \"},\"done\":false}\n",
        "{\"message\":{\"role\":\"assistant\",\"content\":\"developer quit?\"},\"done\":false}\n",
        "{\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true,\"done_reason\":\"stop\"}\n",
    );

    async fn chat_handler(Json(body): Json<Value>) -> (StatusCode, String) {
        if body["model"] == "missing" {
            return (
                StatusCode::NOT_FOUND,
                json!({"error": "model 'missing' not found"}).to_string(),
            );
        }
        if body["stream"] == true {
            (StatusCode::OK, STREAMED_BODY.to_string())
        } else {
            let reply = json!({
                "model": body["model"],
                "message": {"role": "assistant", "content": "Why did the developer quit?"},
                "done": true,
            });
            (StatusCode::OK, reply.to_string())
        }
    }

    async fn embed_handler(Json(body): Json<Value>) -> Json<Value> {
        let len = body["input"].as_str().map(str::len).unwrap_or(0) as f32;
        Json(json!({"model": body["model"], "embeddings": [[len, 0.5, -0.5]]}))
    }

    async fn spawn_mock() -> String {
        let app = Router::new()
            .route("/api/chat", post(chat_handler))
            .route("/api/embed", post(embed_handler));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn closed_port_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    fn client_for(base_url: &str) -> OllamaClient {
        OllamaClient::new(OllamaConfig::new(base_url)).unwrap()
    }

    #[tokio::test]
    async fn test_complete() {
        let client = client_for(&spawn_mock().await);
        let answer = client.complete(&Prompt::from_user("joke")).await.unwrap();
        assert_eq!(answer, "Why did the developer quit?");
    }

    #[tokio::test]
    async fn test_stream_concatenates_to_complete() {
        let client = client_for(&spawn_mock().await);
        let prompt = Prompt::from_user("joke");

        let fragments: Vec<String> = client.stream(&prompt).await.unwrap().try_collect().await.unwrap();
        let full = client.complete(&prompt).await.unwrap();

        assert_eq!(fragments, vec!["Why ", "did the ", "developer quit?"]);
        assert_eq!(fragments.concat(), full);
    }

    #[tokio::test]
    async fn test_error_status_is_generation_unavailable() {
        let mut config = OllamaConfig::new(spawn_mock().await);
        config.chat_model = "missing".to_string();
        let client = OllamaClient::new(config).unwrap();

        let err = client.complete(&Prompt::from_user("joke")).await.unwrap_err();
        assert_eq!(err.kind(), "generation_unavailable");
        assert!(err.to_string().contains("404"));

        let err = client.stream(&Prompt::from_user("joke")).await.err().unwrap();
        assert_eq!(err.kind(), "generation_unavailable");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let client = client_for(&closed_port_url().await);

        let err = client.complete(&Prompt::from_user("joke")).await.unwrap_err();
        assert_eq!(err.kind(), "generation_unavailable");

        let err = client.embed("joke").await.unwrap_err();
        assert_eq!(err.kind(), "generation_unavailable");
    }

    #[tokio::test]
    async fn test_embed() {
        let client = client_for(&spawn_mock().await);
        let vector = client.embed("four").await.unwrap();
        assert_eq!(vector, vec![4.0, 0.5, -0.5]);
    }

    /// Emits one NDJSON fragment every 10ms forever, counting what it produced
    async fn spawn_endless_mock(produced: Arc<AtomicUsize>) -> String {
        let app = Router::new().route(
            "/api/chat",
            post(move || {
                let produced = produced.clone();
                async move {
                    let lines = stream::unfold(0usize, move |i| {
                        let produced = produced.clone();
                        async move {
                            tokio::time::sleep(Duration::from_millis(10)).await;
                            produced.fetch_add(1, Ordering::SeqCst);
                            let line = format!(
                                "{{\"message\":{{\"role\":\"assistant\",\"content\":\"t{} \"}},\"done\":false}}\n",
                                i
                            );
                            Some((Ok::<_, Infallible>(line), i + 1))
                        }
                    });
                    Body::from_stream(lines)
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_dropping_stream_stops_generation() {
        let produced = Arc::new(AtomicUsize::new(0));
        let client = client_for(&spawn_endless_mock(produced.clone()).await);

        let mut fragments = client.stream(&Prompt::from_user("joke")).await.unwrap();
        let mut taken = Vec::new();
        for _ in 0..3 {
            taken.push(fragments.try_next().await.unwrap().unwrap());
        }
        drop(fragments);
        assert_eq!(taken, vec!["t0 ", "t1 ", "t2 "]);

        // let the server notice the closed connection
        tokio::time::sleep(Duration::from_millis(150)).await;
        let settled = produced.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(produced.load(Ordering::SeqCst), settled);
    }
}
