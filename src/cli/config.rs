//! Configuration management for medrag
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.medrag/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::embedding::DEFAULT_EMBEDDING_MODEL;
use crate::errors::{RagError, Result};
use crate::generation::DEFAULT_GENERATION_MODEL;
use crate::knowledge::{ChunkConfig, ExtractMode, DEFAULT_HEADING_MARKER};
use crate::prompt::PromptTemplate;
use crate::query::DEFAULT_TOP_K;

/// Complete configuration for medrag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ollama: OllamaConfig,
    pub embedding: EmbeddingConfig,
    pub generation: GenerationConfig,
    pub retrieval: RetrievalConfig,
    pub knowledge: KnowledgeConfig,
    pub prompt: PromptTemplate,
}

/// Ollama connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub host: String,
    pub port: u16,
}

/// Embedding service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub timeout_secs: u64,
}

/// Generation service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub model: String,
    pub timeout_secs: u64,
}

/// Ranking configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

/// Knowledge source and snapshot configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    pub source: String,
    pub snapshot: String,
    pub mode: ExtractMode,
    pub heading_marker: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 11434,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_GENERATION_MODEL.to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: DEFAULT_TOP_K }
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        let chunks = ChunkConfig::default();
        Self {
            source: "medical_knowledge.txt".to_string(),
            snapshot: "medical_embeddings.json".to_string(),
            mode: ExtractMode::Headings,
            heading_marker: DEFAULT_HEADING_MARKER.to_string(),
            chunk_size: chunks.chunk_size,
            chunk_overlap: chunks.chunk_overlap,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RagError::Config(format!("Failed to read config: {}", e)))?;

        let config = Self::from_toml(&contents)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| RagError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// `~/.medrag/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".medrag").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than 0".to_string()));
        }

        if self.embedding.timeout_secs == 0 || self.generation.timeout_secs == 0 {
            return Err(RagError::Config("timeouts must be greater than 0".to_string()));
        }

        if self.embedding.model.trim().is_empty() || self.generation.model.trim().is_empty() {
            return Err(RagError::Config("model names must not be empty".to_string()));
        }

        if self.knowledge.heading_marker.trim().is_empty() {
            return Err(RagError::Config("heading_marker must not be empty".to_string()));
        }

        if self.prompt.preamble.trim().is_empty() {
            return Err(RagError::Config("prompt preamble must not be empty".to_string()));
        }

        if self.knowledge.chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be greater than 0".to_string()));
        }

        if self.knowledge.chunk_overlap >= self.knowledge.chunk_size {
            return Err(RagError::Config(
                "chunk_overlap must be less than chunk_size".to_string(),
            ));
        }

        Ok(())
    }

    /// Serialize to pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| RagError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Get Ollama base URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.ollama.host, self.ollama.port)
    }

    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_secs(self.embedding.timeout_secs)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation.timeout_secs)
    }

    pub fn chunk_config(&self) -> ChunkConfig {
        ChunkConfig::new(self.knowledge.chunk_size, self.knowledge.chunk_overlap)
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    pub fn source_path(&self) -> PathBuf {
        Self::expand_path(&self.knowledge.source)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        Self::expand_path(&self.knowledge.snapshot)
    }
}
