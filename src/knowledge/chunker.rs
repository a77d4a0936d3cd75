//! Recursive character splitting
//!
//! Alternative to heading extraction for sources without structure. Text is
//! split on the first separator that occurs in it, pieces are merged back
//! into windows of at most `chunk_size` characters with `chunk_overlap`
//! characters carried between neighbours, and pieces still too long are
//! split again with the next separator. Sizes count `char`s, not bytes.

use std::collections::VecDeque;

use super::KnowledgeRecord;

/// Separators tried in order, coarsest first
pub const DEFAULT_SEPARATORS: &[&str] = &[
    "\n\n", "\n", "。", "！", "？", ".", "!", "?", " ", "",
];

/// Chunking configuration
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks
    pub chunk_overlap: usize,
    pub separators: Vec<String>,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ChunkConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            ..Default::default()
        }
    }
}

/// Recursive character text splitter
#[derive(Debug, Clone, Default)]
pub struct TextSplitter {
    config: ChunkConfig,
}

impl TextSplitter {
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Split text into trimmed, non-empty chunks
    pub fn split(&self, text: &str) -> Vec<String> {
        let separators: Vec<&str> = self.config.separators.iter().map(String::as_str).collect();
        self.split_with(text, &separators)
            .into_iter()
            .map(|chunk| chunk.trim().to_string())
            .filter(|chunk| !chunk.is_empty())
            .collect()
    }

    /// Split text into records named `chunk-1`, `chunk-2`, ...
    pub fn extract(&self, text: &str) -> Vec<KnowledgeRecord> {
        self.split(text)
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| KnowledgeRecord::new(format!("chunk-{}", i + 1), chunk))
            .collect()
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let position = separators
            .iter()
            .position(|sep| sep.is_empty() || text.contains(sep))
            .unwrap_or(separators.len().saturating_sub(1));
        let (separator, remaining) = match separators.get(position) {
            Some(sep) => (*sep, &separators[position + 1..]),
            None => ("", &separators[..0]),
        };

        let pieces: Vec<String> = if separator.is_empty() {
            text.chars().map(String::from).collect()
        } else {
            text.split_inclusive(separator).map(String::from).collect()
        };

        let mut chunks = Vec::new();
        let mut pending: Vec<String> = Vec::new();

        for piece in pieces {
            if char_len(&piece) < self.config.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge(&pending));
                pending.clear();
            }
            if remaining.is_empty() {
                chunks.push(piece);
            } else {
                chunks.extend(self.split_with(&piece, remaining));
            }
        }

        if !pending.is_empty() {
            chunks.extend(self.merge(&pending));
        }

        chunks
    }

    /// Pack small pieces into windows, keeping up to `chunk_overlap`
    /// trailing characters of each window at the head of the next
    fn merge(&self, pieces: &[String]) -> Vec<String> {
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;

        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);
            if total + len > size && !window.is_empty() {
                chunks.push(window.iter().copied().collect::<String>());
                while total > overlap || (total + len > size && total > 0) {
                    match window.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }
            window.push_back(piece);
            total += len;
        }

        if !window.is_empty() {
            chunks.push(window.iter().copied().collect::<String>());
        }

        chunks
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
