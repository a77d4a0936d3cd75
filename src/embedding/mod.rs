//! Embedding service client
//!
//! Turns text into a fixed-length vector with one call to Ollama's
//! `POST /api/embeddings`. Failures are returned as `EmbeddingError` and
//! never retried; callers decide whether to abort.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{EmbeddingError, RagError, Result};

/// Default Ollama API endpoint
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

/// Default embedding request timeout
pub const DEFAULT_EMBEDDING_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can embed text
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> std::result::Result<Vec<f64>, EmbeddingError>;

    /// Model identifier sent to the service
    fn model(&self) -> &str;
}

/// Ollama embedding client
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaEmbedder {
    /// Create client with default URL, model and timeout
    pub fn new() -> Result<Self> {
        Self::with_config(DEFAULT_OLLAMA_URL, DEFAULT_EMBEDDING_MODEL, DEFAULT_EMBEDDING_TIMEOUT)
    }

    /// Create client with custom configuration
    pub fn with_config(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RagError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> std::result::Result<Vec<f64>, EmbeddingError> {
        let url = format!("{}/api/embeddings", self.base_url);

        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(EmbeddingError::Status { status, body });
        }

        let body: serde_json::Value = response.json().await?;
        let embedding = parse_embedding(body)?;

        tracing::debug!(model = %self.model, dimension = embedding.len(), "embedding obtained");
        Ok(embedding)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Ollama embeddings request
#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Ollama embeddings response
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f64>,
}

/// Pull the `embedding` array out of a response body
fn parse_embedding(body: serde_json::Value) -> std::result::Result<Vec<f64>, EmbeddingError> {
    if body.get("embedding").is_none() {
        return Err(EmbeddingError::MissingField("embedding"));
    }
    let response: EmbeddingResponse =
        serde_json::from_value(body).map_err(|_| EmbeddingError::MissingField("embedding"))?;

    if response.embedding.is_empty() {
        return Err(EmbeddingError::Empty);
    }
    Ok(response.embedding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let client = OllamaEmbedder::new().unwrap();
        assert_eq!(client.model(), DEFAULT_EMBEDDING_MODEL);
        assert_eq!(client.base_url(), DEFAULT_OLLAMA_URL);
    }

    #[test]
    fn test_client_with_config_trims_slash() {
        let client = OllamaEmbedder::with_config(
            "http://localhost:11434/",
            "mxbai-embed-large",
            Duration::from_secs(2),
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
        assert_eq!(client.model(), "mxbai-embed-large");
    }

    #[test]
    fn test_request_shape() {
        let request = EmbeddingRequest {
            model: "nomic-embed-text",
            prompt: "发热",
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({"model": "nomic-embed-text", "prompt": "发热"}));
    }

    #[test]
    fn test_parse_embedding() {
        let embedding = parse_embedding(json!({"embedding": [0.5, -1.0, 2]})).unwrap();
        assert_eq!(embedding, vec![0.5, -1.0, 2.0]);
    }

    #[test]
    fn test_parse_missing_field() {
        let err = parse_embedding(json!({"error": "model not found"})).unwrap_err();
        assert!(matches!(err, EmbeddingError::MissingField("embedding")));

        let err = parse_embedding(json!({"embedding": "nope"})).unwrap_err();
        assert!(matches!(err, EmbeddingError::MissingField("embedding")));
    }

    #[test]
    fn test_parse_empty_vector() {
        let err = parse_embedding(json!({"embedding": []})).unwrap_err();
        assert!(matches!(err, EmbeddingError::Empty));
    }
}
