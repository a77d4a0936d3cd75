//! HTTP behaviour of the Ollama clients against a local stub server

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::spawn_stub;
use medrag::embedding::{Embedder, OllamaEmbedder};
use medrag::errors::{EmbeddingError, RagError};
use medrag::generation::{answer, Generator, OllamaGenerator, GENERATION_FAILED_PREFIX};
use medrag::knowledge::KnowledgeStoreBuilder;

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_embedding_success_sends_model_and_prompt() {
    let (url, received) = spawn_stub(200, r#"{"embedding":[0.25,-1.5,3.0]}"#).await;
    let embedder = OllamaEmbedder::with_config(&url, "nomic-embed-text", TIMEOUT).unwrap();

    let embedding = embedder.embed("fever and cough").await.unwrap();
    assert_eq!(embedding, vec![0.25, -1.5, 3.0]);

    let bodies = received.lock().unwrap().clone();
    assert_eq!(bodies.len(), 1);
    let request: serde_json::Value = serde_json::from_str(&bodies[0]).unwrap();
    assert_eq!(request["model"], "nomic-embed-text");
    assert_eq!(request["prompt"], "fever and cough");
}

#[tokio::test]
async fn test_embedding_non_success_status() {
    let (url, _) = spawn_stub(500, r#"{"error":"model not found"}"#).await;
    let embedder = OllamaEmbedder::with_config(&url, "nomic-embed-text", TIMEOUT).unwrap();

    match embedder.embed("anything").await {
        Err(EmbeddingError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert!(body.contains("model not found"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_embedding_missing_field() {
    let (url, _) = spawn_stub(200, r#"{"vector":[1.0]}"#).await;
    let embedder = OllamaEmbedder::with_config(&url, "nomic-embed-text", TIMEOUT).unwrap();

    assert!(matches!(
        embedder.embed("anything").await,
        Err(EmbeddingError::MissingField("embedding"))
    ));
}

#[tokio::test]
async fn test_embedding_empty_vector() {
    let (url, _) = spawn_stub(200, r#"{"embedding":[]}"#).await;
    let embedder = OllamaEmbedder::with_config(&url, "nomic-embed-text", TIMEOUT).unwrap();

    assert!(matches!(embedder.embed("anything").await, Err(EmbeddingError::Empty)));
}

#[tokio::test]
async fn test_build_against_failing_service_writes_no_snapshot() {
    let (url, _) = spawn_stub(503, "overloaded").await;
    let embedder = OllamaEmbedder::with_config(&url, "nomic-embed-text", TIMEOUT).unwrap();
    let builder = KnowledgeStoreBuilder::new(Arc::new(embedder));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medical_embeddings.json");
    let result = builder
        .build_to("## Flu\nfever and aches\n## Cold\nrunny nose", &path)
        .await;

    assert!(matches!(
        result,
        Err(RagError::Embedding(EmbeddingError::Status { status: 503, .. }))
    ));
    assert!(!path.exists());
}

#[tokio::test]
async fn test_build_against_stub_service_writes_snapshot() {
    let (url, received) = spawn_stub(200, r#"{"embedding":[1.0,0.0]}"#).await;
    let embedder = OllamaEmbedder::with_config(&url, "nomic-embed-text", TIMEOUT).unwrap();
    let builder = KnowledgeStoreBuilder::new(Arc::new(embedder));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medical_embeddings.json");
    let kb = builder
        .build_to("## Flu\nfever and aches\n## Cold\nrunny nose", &path)
        .await
        .unwrap();

    assert_eq!(kb.len(), 2);
    assert!(path.exists());

    let prompts: Vec<String> = received
        .lock()
        .unwrap()
        .iter()
        .map(|b| serde_json::from_str::<serde_json::Value>(b).unwrap()["prompt"].to_string())
        .collect();
    assert_eq!(prompts, vec!["\"fever and aches\"", "\"runny nose\""]);
}

#[tokio::test]
async fn test_generation_reads_response_field() {
    let (url, received) = spawn_stub(200, r#"{"response":"Rest and fluids.","done":true}"#).await;
    let generator = OllamaGenerator::with_config(&url, "deepseek-r1:1.5b", TIMEOUT).unwrap();

    assert_eq!(generator.generate("prompt").await.unwrap(), "Rest and fluids.");

    let request: serde_json::Value =
        serde_json::from_str(&received.lock().unwrap()[0]).unwrap();
    assert_eq!(request["model"], "deepseek-r1:1.5b");
    assert_eq!(request["stream"], false);
}

#[tokio::test]
async fn test_generation_falls_back_to_text_field() {
    let (url, _) = spawn_stub(200, r#"{"text":"See a doctor."}"#).await;
    let generator = OllamaGenerator::with_config(&url, "deepseek-r1:1.5b", TIMEOUT).unwrap();

    assert_eq!(generator.generate("prompt").await.unwrap(), "See a doctor.");
}

#[tokio::test]
async fn test_generation_failure_is_inline() {
    let (url, _) = spawn_stub(500, r#"{"error":"out of memory"}"#).await;
    let generator = OllamaGenerator::with_config(&url, "deepseek-r1:1.5b", TIMEOUT).unwrap();

    let (text, generated) = answer(&generator, "prompt").await;
    assert!(!generated);
    assert!(text.starts_with(GENERATION_FAILED_PREFIX));
    assert!(text.contains("out of memory"));
}

#[tokio::test]
async fn test_health_check() {
    let (url, _) = spawn_stub(200, r#"{"version":"0.1.0"}"#).await;
    let generator = OllamaGenerator::with_config(&url, "deepseek-r1:1.5b", TIMEOUT).unwrap();
    assert!(generator.health_check().await);

    let (url, _) = spawn_stub(404, "{}").await;
    let generator = OllamaGenerator::with_config(&url, "deepseek-r1:1.5b", TIMEOUT).unwrap();
    assert!(!generator.health_check().await);
}
