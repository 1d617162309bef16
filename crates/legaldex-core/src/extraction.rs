// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`ExtractionResult`], the output of an `Extractor` (§4.2).

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output of a single extraction attempt.
///
/// Invariant: `success` implies `text` is non-empty and `word_count`/
/// `char_count` agree with a fresh recount of `text` — callers that build
/// this directly (rather than via [`ExtractionResult::from_text`]) are
/// responsible for keeping that true.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ExtractionResult {
    /// Extracted plain text.
    pub text: String,
    /// Number of whitespace-delimited words in `text`.
    pub word_count: u64,
    /// Number of characters in `text`.
    pub char_count: u64,
    /// Number of pages the source document contained, at least 1.
    pub page_count: u32,
    /// Detected language, if the extractor determined one.
    pub language: Option<String>,
    /// Extractor-specific metadata (e.g. which cascade step succeeded,
    /// DOCX core properties).
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// Whether extraction succeeded.
    pub success: bool,
    /// Error message when `success` is `false`.
    pub error_message: Option<String>,
    /// Wall-clock duration of the extraction attempt, in milliseconds.
    pub duration_ms: u64,
}

impl ExtractionResult {
    /// Build a successful result from extracted text, deriving word/char
    /// counts by recounting so the invariant always holds.
    #[must_use]
    pub fn from_text(text: String, page_count: u32, duration_ms: u64) -> Self {
        let word_count = text.split_whitespace().count() as u64;
        let char_count = text.chars().count() as u64;
        Self {
            text,
            word_count,
            char_count,
            page_count: page_count.max(1),
            language: None,
            metadata: BTreeMap::new(),
            success: true,
            error_message: None,
            duration_ms,
        }
    }

    /// Build a failed result.
    #[must_use]
    pub fn failure(error_message: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            text: String::new(),
            word_count: 0,
            char_count: 0,
            page_count: 1,
            language: None,
            metadata: BTreeMap::new(),
            success: false,
            error_message: Some(error_message.into()),
            duration_ms,
        }
    }

    /// Record which extraction method (cascade step) produced this result.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.metadata
            .insert("method".to_string(), serde_json::Value::String(method.into()));
        self
    }

    /// Whether `word_count`/`char_count` agree with a recount of `text`.
    #[must_use]
    pub fn counts_are_consistent(&self) -> bool {
        let words = self.text.split_whitespace().count() as u64;
        let chars = self.text.chars().count() as u64;
        words == self.word_count && chars == self.char_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_text_derives_consistent_counts() {
        let result = ExtractionResult::from_text("hello world foo".to_string(), 3, 12);
        assert_eq!(result.word_count, 3);
        assert!(result.success);
        assert!(result.counts_are_consistent());
    }

    #[test]
    fn page_count_floors_at_one() {
        let result = ExtractionResult::from_text("x".to_string(), 0, 1);
        assert_eq!(result.page_count, 1);
    }

    #[test]
    fn failure_has_no_text_and_carries_message() {
        let result = ExtractionResult::failure("bad header", 5);
        assert!(!result.success);
        assert_eq!(result.error_message.as_deref(), Some("bad header"));
        assert!(result.text.is_empty());
    }
}
