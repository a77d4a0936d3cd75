//! Generation service client
//!
//! One non-streaming call to Ollama's `POST /api/generate`. Unlike
//! embedding, a failed generation never aborts anything: [`answer`] turns
//! the error into visible answer text.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::embedding::DEFAULT_OLLAMA_URL;
use crate::errors::{RagError, Result};

/// Default generation model
pub const DEFAULT_GENERATION_MODEL: &str = "deepseek-r1:1.5b";

/// Generation is slow; allow it much longer than embedding
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Prefix of the inline answer produced on failure
pub const GENERATION_FAILED_PREFIX: &str = "[generation failed]";

/// Anything that can turn a prompt into text
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a complete response for `prompt`
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model identifier sent to the service
    fn model(&self) -> &str;
}

/// Ollama generation client
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaGenerator {
    /// Create client with default URL, model and timeout
    pub fn new() -> Result<Self> {
        Self::with_config(DEFAULT_OLLAMA_URL, DEFAULT_GENERATION_MODEL, DEFAULT_GENERATION_TIMEOUT)
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

    /// Check if Ollama is reachable
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/api/version", self.base_url);

        match self.client.get(&url).timeout(Duration::from_secs(2)).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        tracing::debug!(
            model = %self.model,
            prompt_chars = prompt.chars().count(),
            "requesting generation"
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::Generation(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RagError::Generation(format!("HTTP {}: {}", status, error_text)));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RagError::Generation(format!("Failed to parse response: {}", e)))?;

        Ok(response_text(&body))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Ollama generate request
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// `response`, else `text`, else the whole body
fn response_text(body: &serde_json::Value) -> String {
    ["response", "text"]
        .iter()
        .find_map(|field| body.get(*field).and_then(|v| v.as_str()))
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

/// Generate an answer, reporting failure inline instead of erroring
pub async fn answer(generator: &dyn Generator, prompt: &str) -> (String, bool) {
    match generator.generate(prompt).await {
        Ok(text) => (text, true),
        Err(e) => {
            tracing::warn!(model = generator.model(), error = %e, "generation failed");
            let cause = match e {
                RagError::Generation(cause) => cause,
                other => other.to_string(),
            };
            (format!("{}: {}", GENERATION_FAILED_PREFIX, cause), false)
        }
    }
}
