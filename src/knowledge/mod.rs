//! Knowledge base data model
//!
//! A knowledge base is an ordered, immutable sequence of named records, each
//! carrying the embedding of its body text. It is built once offline,
//! persisted as a snapshot, and loaded wholesale at query time.

pub mod builder;
pub mod chunker;
pub mod extractor;
pub mod snapshot;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use builder::KnowledgeStoreBuilder;
pub use chunker::{ChunkConfig, TextSplitter};
pub use extractor::{extract_records, RecordExtractor, DEFAULT_HEADING_MARKER};

/// One named unit of domain text with its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    pub name: String,
    pub text: String,
    /// Empty until the builder attaches it
    #[serde(default)]
    pub embedding: Vec<f64>,
}

impl KnowledgeRecord {
    /// Create a record without an embedding yet
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            embedding: Vec::new(),
        }
    }

    /// Attach an embedding
    pub fn with_embedding(mut self, embedding: Vec<f64>) -> Self {
        self.embedding = embedding;
        self
    }
}

/// Shared read-only handle to a loaded knowledge base
///
/// Cloning is cheap; the records themselves are never mutated after
/// construction.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    records: Arc<[KnowledgeRecord]>,
}

impl KnowledgeBase {
    pub fn new(records: Vec<KnowledgeRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    pub fn records(&self) -> &[KnowledgeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Embedding length shared by all records, if any record exists
    pub fn dimension(&self) -> Option<usize> {
        self.records.first().map(|r| r.embedding.len())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KnowledgeRecord> {
        self.records.iter()
    }
}

impl From<Vec<KnowledgeRecord>> for KnowledgeBase {
    fn from(records: Vec<KnowledgeRecord>) -> Self {
        Self::new(records)
    }
}

/// How the raw source text is cut into records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractMode {
    /// One record per heading
    #[default]
    Headings,
    /// Recursive character splitting into `chunk-<n>` records
    Chunks,
}

impl std::str::FromStr for ExtractMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "headings" => Ok(ExtractMode::Headings),
            "chunks" => Ok(ExtractMode::Chunks),
            other => Err(format!("unknown extraction mode: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knowledge_base_handle_is_shared() {
        let kb = KnowledgeBase::new(vec![
            KnowledgeRecord::new("flu", "fever").with_embedding(vec![1.0, 0.0]),
        ]);
        let other = kb.clone();
        assert_eq!(other.len(), 1);
        assert!(std::ptr::eq(kb.records(), other.records()));
        assert_eq!(kb.dimension(), Some(2));
    }

    #[test]
    fn test_empty_knowledge_base() {
        let kb = KnowledgeBase::default();
        assert!(kb.is_empty());
        assert_eq!(kb.dimension(), None);
    }

    #[test]
    fn test_extract_mode_parse() {
        assert_eq!("Chunks".parse::<ExtractMode>(), Ok(ExtractMode::Chunks));
        assert_eq!("headings".parse::<ExtractMode>(), Ok(ExtractMode::Headings));
        assert!("pages".parse::<ExtractMode>().is_err());
    }
}
