//! Command-line argument parsing for medrag
//!
//! Provides clap-based CLI with subcommands and verbosity control. Flags
//! override values from the configuration file.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::config::Config;
use crate::knowledge::ExtractMode;

/// medrag - Answer medical questions from a local knowledge base
#[derive(Parser, Debug)]
#[command(name = "medrag")]
#[command(version)]
#[command(
    about = "Retrieval-augmented medical Q&A over a local Ollama knowledge base",
    long_about = None
)]
pub struct Args {
    /// Ollama host
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Ollama port
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Embedding model
    #[arg(long, global = true)]
    pub embedding_model: Option<String>,

    /// Generation model
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Knowledge base snapshot file
    #[arg(long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -v shows sources and debug logs, -vv traces
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the knowledge base snapshot from a source text
    Build {
        /// Source text file
        #[arg(long)]
        source: Option<PathBuf>,

        /// Extraction mode: headings or chunks
        #[arg(long)]
        mode: Option<ExtractMode>,

        /// Heading marker for headings mode
        #[arg(long)]
        heading_marker: Option<String>,
    },

    /// Start the interactive question loop
    Ask {
        /// Number of records placed in the prompt
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Answer a single question and exit
    Query {
        /// The question
        question: String,

        /// Number of records placed in the prompt
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Embed texts and print their dimension and leading values
    Probe {
        /// Texts to embed
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// Display effective configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Overlay command-line values onto a loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.ollama.host = host.clone();
        }
        if let Some(port) = self.port {
            config.ollama.port = port;
        }
        if let Some(model) = &self.embedding_model {
            config.embedding.model = model.clone();
        }
        if let Some(model) = &self.model {
            config.generation.model = model.clone();
        }
        if let Some(snapshot) = &self.snapshot {
            config.knowledge.snapshot = snapshot.to_string_lossy().into_owned();
        }

        match &self.command {
            Commands::Build {
                source,
                mode,
                heading_marker,
            } => {
                if let Some(source) = source {
                    config.knowledge.source = source.to_string_lossy().into_owned();
                }
                if let Some(mode) = mode {
                    config.knowledge.mode = *mode;
                }
                if let Some(marker) = heading_marker {
                    config.knowledge.heading_marker = marker.clone();
                }
            }
            Commands::Ask { top_k } | Commands::Query { top_k, .. } => {
                if let Some(top_k) = top_k {
                    config.retrieval.top_k = *top_k;
                }
            }
            Commands::Probe { .. } | Commands::Config => {}
        }
    }
}

impl Verbosity {
    /// Default tracing filter directive for this level
    pub fn filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "medrag=warn",
            Verbosity::Normal => "medrag=info",
            Verbosity::Verbose => "medrag=debug",
            Verbosity::VeryVerbose => "medrag=trace",
        }
    }

    /// Check if answers should list their sources
    pub fn show_sources(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }
}
