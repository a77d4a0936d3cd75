//! Line input for the query loop using rustyline
//!
//! Provides line editing and persistent history. Ctrl-C and Ctrl-D are
//! reported as distinct outcomes; the loop treats both as quit.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

/// Default prompt shown before each question
pub const DEFAULT_PROMPT: &str = "Your medical question: ";

/// One read from the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    /// A trimmed line, possibly empty
    Line(String),
    /// Ctrl-C
    Interrupted,
    /// Ctrl-D / end of input
    Eof,
}

/// Source of user lines
pub trait LineReader {
    fn read_line(&mut self) -> Result<UserInput>;
}

/// Readline-backed input handler
pub struct InputHandler {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
    prompt: String,
}

impl InputHandler {
    pub fn new() -> Result<Self> {
        Ok(InputHandler {
            editor: DefaultEditor::new()?,
            history_path: None,
            prompt: DEFAULT_PROMPT.to_string(),
        })
    }

    /// Create input handler with persistent history
    pub fn with_history(history_file: PathBuf) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;

        if history_file.exists() {
            let _ = editor.load_history(&history_file);
        }

        Ok(InputHandler {
            editor,
            history_path: Some(history_file),
            prompt: DEFAULT_PROMPT.to_string(),
        })
    }

    /// Save history to disk
    pub fn save_history(&mut self) -> Result<()> {
        if let Some(ref path) = self.history_path {
            self.editor.save_history(path)?;
        }
        Ok(())
    }
}

impl LineReader for InputHandler {
    fn read_line(&mut self) -> Result<UserInput> {
        match self.editor.readline(&self.prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    let _ = self.editor.add_history_entry(trimmed);
                }
                Ok(UserInput::Line(trimmed.to_string()))
            }
            Err(ReadlineError::Interrupted) => Ok(UserInput::Interrupted),
            Err(ReadlineError::Eof) => Ok(UserInput::Eof),
            Err(err) => Err(anyhow::anyhow!("Readline error: {}", err)),
        }
    }
}

/// True for the case-insensitive `quit` command
pub fn is_quit(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("quit")
}
