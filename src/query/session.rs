//! Interactive query session
//!
//! Drives the read-evaluate-print cycle through [`QueryState`]. A failed
//! question is logged, shown, and the session returns to the prompt; only
//! `quit`, Ctrl-C, Ctrl-D or a broken input stream end it.

use anyhow::Result;

use super::input::{is_quit, LineReader, UserInput};
use super::pipeline::{Answer, QueryPipeline};
use super::state::{QueryEvent, QueryState};
use crate::display::DisplayManager;
use crate::errors::RagError;

/// Counters for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Questions answered by the model
    pub answered: usize,
    /// Questions whose generation failed (reported inline)
    pub generation_failures: usize,
    /// Questions aborted before generation, e.g. embedding failures
    pub failed: usize,
}

/// Query loop over a pipeline
pub struct QuerySession {
    pipeline: QueryPipeline,
    display: DisplayManager,
    state: QueryState,
    stats: SessionStats,
}

impl QuerySession {
    pub fn new(pipeline: QueryPipeline, display: DisplayManager) -> Self {
        Self {
            pipeline,
            display,
            state: QueryState::AwaitingInput,
            stats: SessionStats::default(),
        }
    }

    pub fn state(&self) -> QueryState {
        self.state
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    fn advance(&mut self, event: QueryEvent) -> crate::errors::Result<()> {
        advance(&mut self.state, event)
    }

    /// Answer one question and print the result
    ///
    /// On error the session is back in `AwaitingInput` when this returns.
    pub async fn handle_question(&mut self, question: &str) -> crate::errors::Result<Answer> {
        let state = &mut self.state;
        let result = self
            .pipeline
            .ask_with_steps(question, |event| advance(state, event))
            .await;

        match result {
            Ok(answer) => {
                self.display.show_answer(&answer);
                self.advance(QueryEvent::Printed)?;
                if answer.generated {
                    self.stats.answered += 1;
                } else {
                    self.stats.generation_failures += 1;
                }
                Ok(answer)
            }
            Err(e) => {
                if self.state.is_in_flight() {
                    self.advance(QueryEvent::QueryFailed)?;
                }
                self.stats.failed += 1;
                Err(e)
            }
        }
    }

    /// Run until quit, EOF, interrupt, or an unreadable input stream
    pub async fn run<R: LineReader>(&mut self, reader: &mut R) -> Result<SessionStats> {
        while !self.state.is_terminal() {
            let line = match reader.read_line() {
                Ok(UserInput::Line(line)) => line,
                Ok(UserInput::Interrupted) | Ok(UserInput::Eof) => {
                    self.advance(QueryEvent::Quit)?;
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "input stream failed, ending session");
                    self.advance(QueryEvent::Quit)?;
                    break;
                }
            };

            if line.is_empty() {
                continue;
            }
            if is_quit(&line) {
                self.advance(QueryEvent::Quit)?;
                break;
            }

            if let Err(e) = self.handle_question(&line).await {
                tracing::error!(error = %e, "query failed");
                match e {
                    RagError::Embedding(cause) => {
                        self.display.show_error(&format!("could not embed question: {}", cause))
                    }
                    other => self.display.show_error(&other.to_string()),
                }
            }
        }

        self.display.show_goodbye();
        Ok(self.stats)
    }
}

fn advance(state: &mut QueryState, event: QueryEvent) -> crate::errors::Result<()> {
    let next = state.transition(event)?;
    tracing::trace!(from = state.display_name(), to = next.display_name(), "query state");
    *state = next;
    Ok(())
}
