//! Telemetry for medrag
//!
//! Pipeline components report progress through [`PipelineObserver`] at each
//! boundary instead of printing. [`TelemetryCollector`] keeps the events and
//! counters and mirrors each event to `tracing`.

use colored::Colorize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Events emitted at component boundaries
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// Record extraction finished
    ExtractionComplete { records: usize },
    /// One embedding came back from the service
    EmbeddingObtained { dimension: usize },
    /// Builder attached an embedding to record `index` of `total`
    RecordEmbedded {
        index: usize,
        total: usize,
        name: String,
    },
    /// Similarity ranking selected these record names
    RankingComplete { top: Vec<String> },
    /// Prompt assembled
    PromptBuilt { chars: usize, contexts: usize },
    /// Generation call finished
    AnswerGenerated { chars: usize, success: bool },
    /// Snapshot persisted
    SnapshotWritten { records: usize },
    /// Snapshot loaded into memory
    SnapshotLoaded { records: usize },
}

/// Hook invoked at each pipeline boundary
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn on_event(&self, _event: &PipelineEvent) {}
}

/// Telemetry statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TelemetryStats {
    pub records_extracted: usize,
    pub embeddings_obtained: usize,
    pub records_embedded: usize,
    pub rankings: usize,
    pub prompts_built: usize,
    pub answers_succeeded: usize,
    pub answers_failed: usize,
}

/// Events kept by a collector; counters cover everything
pub const MAX_RETAINED_EVENTS: usize = 256;

/// Telemetry collector
///
/// Keeps the most recent [`MAX_RETAINED_EVENTS`] events; older ones are
/// dropped but still counted in [`TelemetryStats`].
#[derive(Clone)]
pub struct TelemetryCollector {
    events: Arc<Mutex<VecDeque<PipelineEvent>>>,
    stats: Arc<Mutex<TelemetryStats>>,
    start_time: Instant,
}

impl TelemetryCollector {
    /// Create a new telemetry collector
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::new())),
            stats: Arc::new(Mutex::new(TelemetryStats::default())),
            start_time: Instant::now(),
        }
    }

    /// Record an event
    pub fn record(&self, event: PipelineEvent) {
        {
            let mut stats = self.stats.lock().unwrap();
            match &event {
                PipelineEvent::ExtractionComplete { records } => {
                    stats.records_extracted += records;
                }
                PipelineEvent::EmbeddingObtained { .. } => {
                    stats.embeddings_obtained += 1;
                }
                PipelineEvent::RecordEmbedded { .. } => {
                    stats.records_embedded += 1;
                }
                PipelineEvent::RankingComplete { .. } => {
                    stats.rankings += 1;
                }
                PipelineEvent::PromptBuilt { .. } => {
                    stats.prompts_built += 1;
                }
                PipelineEvent::AnswerGenerated { success, .. } => {
                    if *success {
                        stats.answers_succeeded += 1;
                    } else {
                        stats.answers_failed += 1;
                    }
                }
                PipelineEvent::SnapshotWritten { .. } | PipelineEvent::SnapshotLoaded { .. } => {}
            }
        }

        let mut events = self.events.lock().unwrap();
        if events.len() == MAX_RETAINED_EVENTS {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Get current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        self.stats.lock().unwrap().clone()
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    /// Number of retained events
    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Get recent events (last n)
    pub fn recent_events(&self, n: usize) -> Vec<PipelineEvent> {
        let events = self.events.lock().unwrap();
        let start = events.len().saturating_sub(n);
        events.iter().skip(start).cloned().collect()
    }

    /// Print a session summary
    pub fn display_summary(&self) {
        let stats = self.get_stats();

        println!("\n{}", "Session Summary".bold());
        println!("{}", "─".repeat(37));
        println!("Duration:           {:?}", self.elapsed());
        println!("Questions ranked:   {}", stats.rankings);
        println!("Answers generated:  {}", stats.answers_succeeded);
        println!("Answers failed:     {}", stats.answers_failed);
        println!();
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineObserver for TelemetryCollector {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::ExtractionComplete { records } => {
                tracing::info!(records, "extraction complete");
            }
            PipelineEvent::EmbeddingObtained { dimension } => {
                tracing::debug!(dimension, "embedding obtained");
            }
            PipelineEvent::RecordEmbedded { index, total, name } => {
                tracing::debug!(index, total, %name, "record embedded");
            }
            PipelineEvent::RankingComplete { top } => {
                tracing::info!(?top, "ranking complete");
            }
            PipelineEvent::PromptBuilt { chars, contexts } => {
                tracing::debug!(chars, contexts, "prompt built");
            }
            PipelineEvent::AnswerGenerated { chars, success } => {
                tracing::info!(chars, success, "answer generated");
            }
            PipelineEvent::SnapshotWritten { records } => {
                tracing::info!(records, "snapshot written");
            }
            PipelineEvent::SnapshotLoaded { records } => {
                tracing::info!(records, "snapshot loaded");
            }
        }
        self.record(event.clone());
    }
}
