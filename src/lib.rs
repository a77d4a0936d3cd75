//! medrag - retrieval-augmented medical question answering
//!
//! # Architecture
//!
//! - **Offline**: [`knowledge`] extracts named records from a source text,
//!   embeds each through [`embedding`] and writes a JSON snapshot.
//! - **Online**: [`query`] loads the snapshot, embeds each question, ranks
//!   records by cosine similarity ([`retrieval`]), assembles a prompt
//!   ([`prompt`]) and asks the generation model ([`generation`]).

pub mod errors;

pub use errors::{EmbeddingError, RagError, Result};

pub mod cli;
pub mod display;
pub mod embedding;
pub mod generation;
pub mod knowledge;
pub mod prompt;
pub mod query;
pub mod retrieval;
pub mod telemetry;
