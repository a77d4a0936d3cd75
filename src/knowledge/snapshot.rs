//! Knowledge base snapshot persistence
//!
//! A snapshot is a pretty-printed UTF-8 JSON array of
//! `{name, text, embedding}` objects. Writes go through a sibling temporary
//! file and a rename so readers never observe a partial snapshot.

use std::fs;
use std::path::{Path, PathBuf};

use super::{KnowledgeBase, KnowledgeRecord};
use crate::errors::{RagError, Result};

/// Write a knowledge base snapshot to `path`
pub fn save(kb: &KnowledgeBase, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(kb.records())?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = temp_path(path);
    if let Err(e) = fs::write(&tmp, json).and_then(|()| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    tracing::debug!(path = %path.display(), records = kb.len(), "snapshot written");
    Ok(())
}

/// Load and validate a snapshot from `path`
///
/// Fails with `MalformedSnapshot` when the file can't be read or parsed,
/// when a record has no embedding, or when embedding lengths disagree.
pub fn load(path: &Path) -> Result<KnowledgeBase> {
    let json = fs::read_to_string(path).map_err(|e| {
        RagError::MalformedSnapshot(format!("cannot read {}: {}", path.display(), e))
    })?;
    let records = parse(&json)?;
    tracing::debug!(path = %path.display(), records = records.len(), "snapshot loaded");
    Ok(KnowledgeBase::new(records))
}

/// Parse and validate snapshot JSON
pub fn parse(json: &str) -> Result<Vec<KnowledgeRecord>> {
    let records: Vec<KnowledgeRecord> = serde_json::from_str(json)
        .map_err(|e| RagError::MalformedSnapshot(e.to_string()))?;
    validate(&records)?;
    Ok(records)
}

/// Check the shared-dimension invariant
pub fn validate(records: &[KnowledgeRecord]) -> Result<()> {
    let Some(first) = records.first() else {
        return Ok(());
    };
    let dimension = first.embedding.len();

    for (index, record) in records.iter().enumerate() {
        if record.embedding.is_empty() {
            return Err(RagError::MalformedSnapshot(format!(
                "record {} ({:?}) has no embedding",
                index, record.name
            )));
        }
        if record.embedding.len() != dimension {
            return Err(RagError::MalformedSnapshot(format!(
                "record {} ({:?}) has embedding length {}, expected {}",
                index,
                record.name,
                record.embedding.len(),
                dimension
            )));
        }
    }

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
