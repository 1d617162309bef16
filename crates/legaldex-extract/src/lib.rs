// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]
//! Format-specific byte-to-text extraction (§4.2): a small set of
//! [`Extractor`] implementations behind an [`ExtractorRegistry`], plus an
//! [`enhanced::EnhancedExtractionService`] that layers PDF-specific
//! document-kind analysis and an optional OCR fallback on top of the
//! registry's plain dispatch.

pub mod analyzer;
pub mod docx;
pub mod enhanced;
mod error;
mod hints;
pub mod ocr;
pub mod pdf;
pub mod plaintext;
pub mod registry;

pub use docx::DocxExtractor;
pub use error::ExtractError;
pub use hints::{resolve_format, ExtractionHints};
pub use ocr::{OcrCapability, OcrPageResult};
pub use pdf::PdfExtractor;
pub use plaintext::PlainTextExtractor;
pub use registry::{Extractor, ExtractorRegistry};

/// Build the default registry wired with [`PlainTextExtractor`],
/// [`DocxExtractor`] and [`PdfExtractor`], using `cleaner_config` for every
/// extractor's post-extraction cleaning pass and `extraction_config` for
/// the PDF cascade's thresholds. No OCR capability is attached; callers
/// that have one should build a [`PdfExtractor`] directly via
/// [`PdfExtractor::with_ocr`] and register it in place of this one.
#[must_use]
pub fn default_registry(
    cleaner_config: legaldex_textclean::CleanerConfig,
    extraction_config: legaldex_config::ExtractionConfig,
) -> ExtractorRegistry {
    let mut registry = ExtractorRegistry::new();
    registry.register(std::sync::Arc::new(PlainTextExtractor::new(cleaner_config.clone())));
    registry.register(std::sync::Arc::new(DocxExtractor::new(cleaner_config.clone())));
    registry.register(std::sync::Arc::new(PdfExtractor::new(extraction_config, cleaner_config)));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_registry_resolves_every_bundled_format() {
        let registry = default_registry(
            legaldex_textclean::CleanerConfig::default(),
            legaldex_config::ExtractionConfig::default(),
        );
        for format in ["txt", "docx", "pdf"] {
            assert!(registry.get(format).is_some(), "missing extractor for {format}");
        }
    }
}
