// SPDX-License-Identifier: MIT OR Apache-2.0
//! Plain-text extractor (§4.2 "PlainText").

use async_trait::async_trait;
use legaldex_core::ExtractionResult;
use legaldex_textclean::{clean, CleanerConfig};

use crate::error::ExtractError;
use crate::hints::ExtractionHints;
use crate::registry::Extractor;

/// Decodes UTF-8 (replacing invalid sequences with the replacement
/// character) and passes the result through the text cleaner.
pub struct PlainTextExtractor {
    cleaner_config: CleanerConfig,
}

impl PlainTextExtractor {
    /// Build an extractor using `cleaner_config` for the post-decode cleaning
    /// pass.
    #[must_use]
    pub fn new(cleaner_config: CleanerConfig) -> Self {
        Self { cleaner_config }
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new(CleanerConfig::default())
    }
}

#[async_trait]
impl Extractor for PlainTextExtractor {
    fn supported_formats(&self) -> &'static [&'static str] {
        &["txt", "text"]
    }

    async fn extract(
        &self,
        bytes: &[u8],
        _hints: &ExtractionHints,
    ) -> Result<ExtractionResult, ExtractError> {
        let start = std::time::Instant::now();
        let decoded = String::from_utf8_lossy(bytes);
        let cleaned = clean(&decoded, &self.cleaner_config);
        let duration_ms = start.elapsed().as_millis() as u64;
        Ok(ExtractionResult::from_text(cleaned, 1, duration_ms).with_method("plain_text"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn decodes_valid_utf8() {
        let extractor = PlainTextExtractor::default();
        let result = extractor
            .extract("Order granted.".as_bytes(), &ExtractionHints::default())
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.text, "Order granted.");
    }

    #[tokio::test]
    async fn replaces_invalid_utf8_sequences() {
        let extractor = PlainTextExtractor::default();
        let bytes = [b'a', 0xFF, b'b'];
        let result = extractor
            .extract(&bytes, &ExtractionHints::default())
            .await
            .unwrap();
        assert!(result.text.contains('\u{FFFD}'));
    }
}
