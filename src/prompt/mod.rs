//! Prompt assembly for the generation model
//!
//! Layout: preamble, the ranked records as `Disease:`/`Content:` blocks
//! separated by blank lines, then the question and an answer cue. No
//! truncation is applied; oversized context is passed through unchanged.

use serde::{Deserialize, Serialize};

use crate::knowledge::KnowledgeRecord;

/// Default instructional preamble
pub const DEFAULT_PREAMBLE: &str = "You are a professional medical assistant. \
Using the disease reference material below together with the user's question, \
give a detailed, accurate answer in plain language.";

/// Fixed text around the retrieved context
///
/// Loaded from the `[prompt]` config section; missing keys keep defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptTemplate {
    pub preamble: String,
    pub context_header: String,
    pub question_header: String,
    pub answer_header: String,
    pub name_label: String,
    pub text_label: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            preamble: DEFAULT_PREAMBLE.to_string(),
            context_header: "[Reference Material]".to_string(),
            question_header: "[Question]".to_string(),
            answer_header: "[Answer]".to_string(),
            name_label: "Disease".to_string(),
            text_label: "Content".to_string(),
        }
    }
}

/// Builds the generation prompt from a question and ranked records
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    template: PromptTemplate,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(template: PromptTemplate) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    /// Render one record
    pub fn format_record(&self, record: &KnowledgeRecord) -> String {
        format!(
            "{}: {}\n{}: {}",
            self.template.name_label, record.name, self.template.text_label, record.text
        )
    }

    /// Build the full prompt; records are rendered in the order given
    pub fn build<'a, I>(&self, question: &str, records: I) -> String
    where
        I: IntoIterator<Item = &'a KnowledgeRecord>,
    {
        let context = records
            .into_iter()
            .map(|r| self.format_record(r))
            .collect::<Vec<_>>()
            .join("\n\n");

        let t = &self.template;
        format!(
            "{}\n\n{}\n{}\n\n{}\n{}\n\n{}",
            t.preamble, t.context_header, context, t.question_header, question, t.answer_header
        )
    }
}
