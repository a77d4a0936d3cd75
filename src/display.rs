//! Terminal presentation
//!
//! Colored banner, answers and errors for the query loop, plus an
//! indicatif progress bar that follows the offline build through the
//! pipeline observer hook.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

use crate::query::pipeline::Answer;
use crate::telemetry::{PipelineEvent, PipelineObserver, TelemetryCollector};

/// Display manager for the interactive session
#[derive(Debug, Clone, Default)]
pub struct DisplayManager {
    verbose: bool,
}

impl DisplayManager {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Show welcome banner
    pub fn show_banner(&self, version: &str, model: &str, records: usize) {
        let width = 64;
        let rule = "=".repeat(width).cyan();
        let title = format!("  medrag {} - Medical Q&A", version);
        let info = format!("  Model: {} | Knowledge records: {}", model, records);

        println!("\n{}", rule);
        println!("{}", title.bold().cyan());
        println!("{}", info.dimmed());
        println!("{}\n", rule);
        println!("Ask a medical question (type {} to exit)\n", "quit".green());
    }

    /// Print an answer, with its sources when verbose
    pub fn show_answer(&self, answer: &Answer) {
        if self.verbose {
            self.show_sources(answer);
        }

        println!();
        if answer.generated {
            println!("{}", "[Answer]".green().bold());
            println!("{}", answer.text);
        } else {
            println!("{}", answer.text.red());
        }
        println!();
    }

    fn show_sources(&self, answer: &Answer) {
        println!("\n{}", "Sources".bold().cyan());
        for (record, similarity) in answer
            .context
            .records
            .iter()
            .zip(answer.context.similarities.iter())
        {
            println!("  {} {} ({:.4})", "•".cyan(), record.name, similarity);
        }
    }

    /// Show error message
    pub fn show_error(&self, error: &str) {
        println!("{} {}", "Error:".red().bold(), error.red());
    }

    /// Show warning message
    pub fn show_warning(&self, warning: &str) {
        println!("{} {}", "Warning:".yellow().bold(), warning.yellow());
    }

    /// Show info message
    pub fn show_info(&self, info: &str) {
        println!("{} {}", "Info:".cyan(), info);
    }

    /// Show farewell on exit
    pub fn show_goodbye(&self) {
        println!("{}", "Goodbye!".cyan());
    }
}

/// Progress bar driven by build events
///
/// Forwards every event to an inner collector so logging and counters
/// still happen.
pub struct BuildProgress {
    bar: Mutex<Option<ProgressBar>>,
    collector: TelemetryCollector,
}

impl BuildProgress {
    pub fn new(collector: TelemetryCollector) -> Self {
        Self {
            bar: Mutex::new(None),
            collector,
        }
    }

    /// Finish and clear the bar, if one was started
    pub fn finish(&self) {
        if let Some(bar) = self.bar.lock().unwrap().take() {
            bar.finish_and_clear();
        }
    }
}

impl PipelineObserver for BuildProgress {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::ExtractionComplete { records } => {
                let bar = ProgressBar::new(*records as u64);
                if let Ok(style) = ProgressStyle::default_bar()
                    .template("{spinner:.cyan} Embedding [{bar:40.cyan/blue}] {pos}/{len} | {msg}")
                {
                    bar.set_style(style.progress_chars("=>-"));
                }
                *self.bar.lock().unwrap() = Some(bar);
            }
            PipelineEvent::RecordEmbedded { index, name, .. } => {
                if let Some(bar) = self.bar.lock().unwrap().as_ref() {
                    bar.set_position(*index as u64);
                    bar.set_message(name.clone());
                }
            }
            _ => {}
        }
        self.collector.on_event(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_manager_verbosity() {
        assert!(!DisplayManager::default().is_verbose());
        assert!(DisplayManager::new(true).is_verbose());
    }

    #[test]
    fn test_build_progress_forwards_events() {
        let collector = TelemetryCollector::new();
        let progress = BuildProgress::new(collector.clone());

        progress.on_event(&PipelineEvent::ExtractionComplete { records: 2 });
        progress.on_event(&PipelineEvent::RecordEmbedded {
            index: 1,
            total: 2,
            name: "flu".to_string(),
        });
        progress.finish();

        let stats = collector.get_stats();
        assert_eq!(stats.records_extracted, 2);
        assert_eq!(stats.records_embedded, 1);
    }
}
