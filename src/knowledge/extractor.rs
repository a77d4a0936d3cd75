//! Heading-delimited record extraction
//!
//! The source is scanned line by line. A heading line (`<marker> <name>`)
//! starts a new record; the lines up to the next heading form its body.
//! Text before the first heading is discarded and headings whose body is
//! empty or whitespace-only produce no record.

use super::KnowledgeRecord;

/// Default heading marker, a level-two markdown heading
pub const DEFAULT_HEADING_MARKER: &str = "##";

/// Splits raw text into named records at heading lines
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    marker: String,
}

impl RecordExtractor {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Return the entry name if `line` is a heading
    ///
    /// The marker must be followed by whitespace and a non-empty name, so
    /// `### Sub` is not a `##` heading.
    pub fn heading_name<'a>(&self, line: &'a str) -> Option<&'a str> {
        let rest = line.trim_start().strip_prefix(self.marker.as_str())?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let name = rest.trim();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Extract records in source order, embeddings left empty
    pub fn extract(&self, text: &str) -> Vec<KnowledgeRecord> {
        let mut records = Vec::new();
        let mut current: Option<(&str, Vec<&str>)> = None;

        for line in text.lines() {
            if let Some(name) = self.heading_name(line) {
                if let Some((prev, body)) = current.take() {
                    flush(&mut records, prev, &body);
                }
                current = Some((name, Vec::new()));
            } else if let Some((_, body)) = current.as_mut() {
                body.push(line);
            }
        }

        if let Some((name, body)) = current {
            flush(&mut records, name, &body);
        }

        records
    }
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_HEADING_MARKER)
    }
}

fn flush(records: &mut Vec<KnowledgeRecord>, name: &str, body: &[&str]) {
    let text = body.join("\n");
    let text = text.trim();
    if !text.is_empty() {
        records.push(KnowledgeRecord::new(name, text));
    }
}

/// Extract records using the default `##` marker
pub fn extract_records(text: &str) -> Vec<KnowledgeRecord> {
    RecordExtractor::default().extract(text)
}
