//! Query loop state machine
//!
//! Valid transitions:
//!
//! ```text
//! 1. AwaitingInput    → EmbeddingQuery   (on: QuestionReceived)
//! 2. EmbeddingQuery   → Ranking          (on: QueryEmbedded)
//! 3. Ranking          → BuildingPrompt   (on: Ranked)
//! 4. BuildingPrompt   → GeneratingAnswer (on: PromptReady)
//! 5. GeneratingAnswer → Printing         (on: AnswerReady)
//! 6. Printing         → AwaitingInput    (on: Printed)
//! 7. any in-flight    → AwaitingInput    (on: QueryFailed)
//! 8. any state        → Terminated       (on: Quit)
//! ```

use crate::errors::{RagError, Result};

/// Query loop states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryState {
    AwaitingInput,
    EmbeddingQuery,
    Ranking,
    BuildingPrompt,
    GeneratingAnswer,
    Printing,
    /// Terminal
    Terminated,
}

/// Events that trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryEvent {
    QuestionReceived,
    QueryEmbedded,
    Ranked,
    PromptReady,
    AnswerReady,
    Printed,
    /// Current question failed; go back to the prompt
    QueryFailed,
    /// Quit command, EOF or interrupt
    Quit,
}

impl QueryState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, QueryState::Terminated)
    }

    /// True while a question is being processed
    pub fn is_in_flight(&self) -> bool {
        !matches!(self, QueryState::AwaitingInput | QueryState::Terminated)
    }

    /// Attempt a state transition
    pub fn transition(&self, event: QueryEvent) -> Result<QueryState> {
        use QueryEvent::*;
        use QueryState::*;

        if event == Quit {
            return Ok(Terminated);
        }

        let next = match (self, event) {
            (AwaitingInput, QuestionReceived) => EmbeddingQuery,
            (EmbeddingQuery, QueryEmbedded) => Ranking,
            (Ranking, Ranked) => BuildingPrompt,
            (BuildingPrompt, PromptReady) => GeneratingAnswer,
            (GeneratingAnswer, AnswerReady) => Printing,
            (Printing, Printed) => AwaitingInput,
            (state, QueryFailed) if state.is_in_flight() => AwaitingInput,
            (Terminated, _) => Terminated,
            (from, event) => {
                return Err(RagError::InvalidTransition {
                    from: format!("{:?}", from),
                    to: format!("(via {:?})", event),
                });
            }
        };

        Ok(next)
    }

    /// Human-readable state name
    pub fn display_name(&self) -> &'static str {
        match self {
            QueryState::AwaitingInput => "Awaiting input",
            QueryState::EmbeddingQuery => "Embedding question",
            QueryState::Ranking => "Ranking knowledge",
            QueryState::BuildingPrompt => "Building prompt",
            QueryState::GeneratingAnswer => "Generating answer",
            QueryState::Printing => "Printing",
            QueryState::Terminated => "Terminated",
        }
    }
}
