//! Summarization of evicted conversation turns
//!
//! Compacts a block of turns into a short running summary through the model.

use std::sync::Arc;

use crate::core::{ParleyError, Result, Turn};
use crate::llm::{GenerateOptions, TextGenerator};

/// Longest summary kept, in lines
const MAX_SUMMARY_LINES: usize = 3;

/// Produces 2-3 line summaries of transcript blocks
#[derive(Clone)]
pub struct Summarizer {
    generator: Arc<dyn TextGenerator>,
    options: GenerateOptions,
}

impl Summarizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            options: GenerateOptions::new(100, 0.5).with_stop(Vec::new()),
        }
    }

    /// Build the summarization prompt for a block of turns
    pub fn prompt(turns: &[Turn]) -> String {
        let transcript = turns
            .iter()
            .map(Turn::transcript_line)
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Please summarize this conversation briefly in 2-3 sentences.\n\
             Focus on the key topics discussed and any important information about the user.\n\n\
             Conversation:\n{}\n\nSummary:",
            transcript
        )
    }

    /// Summarize `turns`. An empty model reply counts as a failure.
    pub async fn summarize(&self, turns: &[Turn]) -> Result<String> {
        let raw = self
            .generator
            .generate(&Self::prompt(turns), &self.options)
            .await?;

        let summary = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(MAX_SUMMARY_LINES)
            .collect::<Vec<_>>()
            .join("\n");

        if summary.is_empty() {
            return Err(ParleyError::generation("model returned an empty summary"));
        }

        Ok(summary)
    }
}
