//! Similarity ranking over an in-memory knowledge base

pub mod ranker;

pub use ranker::{cosine_similarity, rank, top_k, ScoredRecord};
