//! Offline knowledge store construction
//!
//! Extracts records from the source text, embeds each body in source order
//! and persists the result. Any embedding failure aborts the build before
//! anything is written.

use std::path::Path;
use std::sync::Arc;

use super::{
    snapshot, ChunkConfig, ExtractMode, KnowledgeBase, KnowledgeRecord, RecordExtractor,
    TextSplitter,
};
use crate::embedding::Embedder;
use crate::errors::{EmbeddingError, RagError, Result};
use crate::telemetry::{NoopObserver, PipelineEvent, PipelineObserver};

/// How records are cut from the source
#[derive(Debug, Clone)]
pub enum Extraction {
    Headings(RecordExtractor),
    Chunks(TextSplitter),
}

impl Extraction {
    pub fn from_mode(mode: ExtractMode, heading_marker: &str, chunks: ChunkConfig) -> Self {
        match mode {
            ExtractMode::Headings => Extraction::Headings(RecordExtractor::new(heading_marker)),
            ExtractMode::Chunks => Extraction::Chunks(TextSplitter::new(chunks)),
        }
    }

    pub fn extract(&self, text: &str) -> Vec<KnowledgeRecord> {
        match self {
            Extraction::Headings(extractor) => extractor.extract(text),
            Extraction::Chunks(splitter) => splitter.extract(text),
        }
    }
}

impl Default for Extraction {
    fn default() -> Self {
        Extraction::Headings(RecordExtractor::default())
    }
}

/// Builds a knowledge base from raw text with an embedding client
pub struct KnowledgeStoreBuilder {
    embedder: Arc<dyn Embedder>,
    extraction: Extraction,
    observer: Arc<dyn PipelineObserver>,
}

impl KnowledgeStoreBuilder {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            extraction: Extraction::default(),
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_extraction(mut self, extraction: Extraction) -> Self {
        self.extraction = extraction;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Extract records without embeddings
    pub fn extract(&self, source: &str) -> Vec<KnowledgeRecord> {
        let records = self.extraction.extract(source);
        self.observer.on_event(&PipelineEvent::ExtractionComplete {
            records: records.len(),
        });
        records
    }

    /// Extract and embed every record, in source order
    ///
    /// An empty extraction is not an error and yields an empty knowledge
    /// base. The first embedding failure is returned as-is.
    pub async fn build(&self, source: &str) -> Result<KnowledgeBase> {
        let records = self.extract(source);
        if records.is_empty() {
            tracing::warn!("{}", RagError::ExtractionEmpty);
            return Ok(KnowledgeBase::default());
        }

        let total = records.len();
        let mut dimension: Option<usize> = None;
        let mut embedded = Vec::with_capacity(total);

        for (index, record) in records.into_iter().enumerate() {
            let embedding = self.embedder.embed(&record.text).await.map_err(|e| {
                tracing::error!(
                    record = %record.name,
                    error = %e,
                    "embedding failed, aborting build"
                );
                e
            })?;

            match dimension {
                None => dimension = Some(embedding.len()),
                Some(expected) if expected != embedding.len() => {
                    return Err(EmbeddingError::DimensionMismatch {
                        expected,
                        got: embedding.len(),
                    }
                    .into());
                }
                Some(_) => {}
            }

            self.observer.on_event(&PipelineEvent::EmbeddingObtained {
                dimension: embedding.len(),
            });
            self.observer.on_event(&PipelineEvent::RecordEmbedded {
                index: index + 1,
                total,
                name: record.name.clone(),
            });
            embedded.push(record.with_embedding(embedding));
        }

        Ok(KnowledgeBase::new(embedded))
    }

    /// Build and write the snapshot; nothing is written on failure
    pub async fn build_to(&self, source: &str, path: &Path) -> Result<KnowledgeBase> {
        let kb = self.build(source).await?;
        snapshot::save(&kb, path)?;
        self.observer.on_event(&PipelineEvent::SnapshotWritten { records: kb.len() });
        Ok(kb)
    }
}
